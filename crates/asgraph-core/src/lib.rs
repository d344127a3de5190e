//! asgraph-core: string interner, attribute model and the little-endian
//! binary primitives shared by both graph flavors.

pub mod attribute;
pub mod error;
pub mod io;
pub mod strtable;


pub use attribute::{Attribute, AttributeList, AttributeType, AttributeValue};
pub use error::{CodecError, Result};
pub use io::{BinaryReader, BinaryWriter, LeBytes};
pub use strtable::{Key, StrTable};
