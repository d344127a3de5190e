//! Static node/edge schema.
//!
//! Every concrete [`NodeKind`] is assembled from ordered field groups
//! (named, member, scope, ...) the way a declaration inherits from its
//! abstract bases. The flattened [`KindSchema`] fixes the order in which
//! attributes, positions and edges are stored, traversed and serialized.

use bitflags::bitflags;
use std::fmt;
use std::sync::OnceLock;

bitflags! {
    /// Abstract capabilities a node kind satisfies.
    ///
    /// Edge targets are checked against these sets instead of walking an
    /// inheritance chain.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capability: u32 {
        const BASE = 1 << 0;
        const NAMED = 1 << 1;
        const MEMBER = 1 << 2;
        const SCOPE = 1 << 3;
        const PACKAGE = 1 << 4;
        const CLASS = 1 << 5;
        const METHOD = 1 << 6;
        const ATTRIBUTE = 1 << 7;
        const PARAMETER = 1 << 8;
        const METHOD_CALL = 1 << 9;
        const TYPE = 1 << 10;
        const SIMPLE_TYPE = 1 << 11;
        const TYPE_FORMER = 1 << 12;
        const COMMENT = 1 << 13;
        const COMPONENT = 1 << 14;
        const FS_ENTRY = 1 << 15;
        const FILE = 1 << 16;
        const FOLDER = 1 << 17;
        const FILE_SYSTEM = 1 << 18;
    }
}

/// Concrete node kind. The discriminant is the on-disk tag; `0` is
/// reserved for the end-of-file sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum NodeKind {
    Package = 1,
    Class = 2,
    Method = 3,
    Attribute = 4,
    Parameter = 5,
    MethodCall = 6,
    Type = 7,
    SimpleType = 8,
    TypeFormerType = 9,
    TypeFormerArray = 10,
    Comment = 11,
    Component = 12,
    FileSystem = 13,
    Folder = 14,
    File = 15,
}

impl NodeKind {
    pub const ALL: [NodeKind; 15] = [
        NodeKind::Package,
        NodeKind::Class,
        NodeKind::Method,
        NodeKind::Attribute,
        NodeKind::Parameter,
        NodeKind::MethodCall,
        NodeKind::Type,
        NodeKind::SimpleType,
        NodeKind::TypeFormerType,
        NodeKind::TypeFormerArray,
        NodeKind::Comment,
        NodeKind::Component,
        NodeKind::FileSystem,
        NodeKind::Folder,
        NodeKind::File,
    ];

    pub fn from_u16(tag: u16) -> Option<NodeKind> {
        Self::ALL.iter().copied().find(|k| *k as u16 == tag)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Package => "Package",
            NodeKind::Class => "Class",
            NodeKind::Method => "Method",
            NodeKind::Attribute => "Attribute",
            NodeKind::Parameter => "Parameter",
            NodeKind::MethodCall => "MethodCall",
            NodeKind::Type => "Type",
            NodeKind::SimpleType => "SimpleType",
            NodeKind::TypeFormerType => "TypeFormerType",
            NodeKind::TypeFormerArray => "TypeFormerArray",
            NodeKind::Comment => "Comment",
            NodeKind::Component => "Component",
            NodeKind::FileSystem => "FileSystem",
            NodeKind::Folder => "Folder",
            NodeKind::File => "File",
        }
    }

    /// Capabilities this kind satisfies (always includes `BASE`).
    pub fn caps(self) -> Capability {
        use Capability as C;
        let own = match self {
            NodeKind::Package => C::NAMED | C::MEMBER | C::SCOPE | C::PACKAGE,
            NodeKind::Class => C::NAMED | C::MEMBER | C::SCOPE | C::CLASS,
            NodeKind::Method => C::NAMED | C::MEMBER | C::SCOPE | C::METHOD,
            NodeKind::Attribute => C::NAMED | C::MEMBER | C::ATTRIBUTE,
            NodeKind::Parameter => C::NAMED | C::PARAMETER,
            NodeKind::MethodCall => C::METHOD_CALL,
            NodeKind::Type => C::TYPE,
            NodeKind::SimpleType => C::SIMPLE_TYPE,
            NodeKind::TypeFormerType | NodeKind::TypeFormerArray => C::TYPE_FORMER,
            NodeKind::Comment => C::COMMENT,
            NodeKind::Component => C::NAMED | C::COMPONENT,
            NodeKind::FileSystem => C::NAMED | C::FILE_SYSTEM,
            NodeKind::Folder => C::NAMED | C::FS_ENTRY | C::FOLDER,
            NodeKind::File => C::NAMED | C::FS_ENTRY | C::FILE,
        };
        own | C::BASE
    }

    pub fn is(self, cap: Capability) -> bool {
        self.caps().intersects(cap)
    }

    /// Nodes that live outside the containment tree: shared types, call
    /// sites, comments, components and the file system root.
    pub fn is_special(self) -> bool {
        matches!(
            self,
            NodeKind::MethodCall
                | NodeKind::Type
                | NodeKind::SimpleType
                | NodeKind::TypeFormerType
                | NodeKind::TypeFormerArray
                | NodeKind::Comment
                | NodeKind::Component
                | NodeKind::FileSystem
        )
    }

    pub fn schema(self) -> &'static KindSchema {
        let table = SCHEMAS.get_or_init(build_schemas);
        &table[self as usize - 1]
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value type of a scalar attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    Int,
    Float,
    Str,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarType::Bool => "bool",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Str => "string",
        })
    }
}

/// Scalar attribute declared by a field group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    Name,
    Accessibility,
    IsStatic,
    IsCompilerGenerated,
    IsAbstract,
    Lloc,
    IsVirtual,
    NumberOfStatements,
    ParamKind,
    Text,
    Spelling,
    SimpleTypeKind,
    Loc,
    NumberOfComments,
}

impl AttrKind {
    pub fn scalar_type(self) -> ScalarType {
        match self {
            AttrKind::Name | AttrKind::Text | AttrKind::Spelling => ScalarType::Str,
            AttrKind::IsStatic
            | AttrKind::IsCompilerGenerated
            | AttrKind::IsAbstract
            | AttrKind::IsVirtual => ScalarType::Bool,
            AttrKind::Accessibility
            | AttrKind::Lloc
            | AttrKind::NumberOfStatements
            | AttrKind::ParamKind
            | AttrKind::SimpleTypeKind
            | AttrKind::Loc
            | AttrKind::NumberOfComments => ScalarType::Int,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttrKind::Name => "name",
            AttrKind::Accessibility => "accessibility",
            AttrKind::IsStatic => "isStatic",
            AttrKind::IsCompilerGenerated => "isCompilerGenerated",
            AttrKind::IsAbstract => "isAbstract",
            AttrKind::Lloc => "lloc",
            AttrKind::IsVirtual => "isVirtual",
            AttrKind::NumberOfStatements => "numberOfStatements",
            AttrKind::ParamKind => "paramKind",
            AttrKind::Text => "text",
            AttrKind::Spelling => "spelling",
            AttrKind::SimpleTypeKind => "simpleTypeKind",
            AttrKind::Loc => "loc",
            AttrKind::NumberOfComments => "numberOfComments",
        }
    }
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source-position attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosKind {
    Position,
    BodyPosition,
}

impl fmt::Display for PosKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PosKind::Position => "position",
            PosKind::BodyPosition => "bodyPosition",
        })
    }
}

/// Every edge declared anywhere in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {
    MemberBelongsTo,
    MemberHasComment,
    MemberIsContainedIn,
    ScopeHasMember,
    ClassHasInitializer,
    ClassIsSubclass,
    MethodReturns,
    MethodHasParameter,
    MethodCalls,
    MethodOverrides,
    MethodThrows,
    AttributeHasType,
    ParameterHasType,
    MethodCallMethod,
    TypeHasTypeFormer,
    TypeFormerTypeRefersTo,
    ComponentContains,
    FsContains,
    FileHasComment,
}

/// Shape of one edge: cardinality, ownership and accepted targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeDesc {
    pub multi: bool,
    /// Containment edges record the source as the target's parent.
    pub containment: bool,
    /// Target kind must satisfy at least one of these capabilities.
    pub target: Capability,
}

impl EdgeKind {
    pub fn desc(self) -> EdgeDesc {
        use Capability as C;
        let (multi, containment, target) = match self {
            EdgeKind::MemberBelongsTo => (true, false, C::COMPONENT),
            EdgeKind::MemberHasComment => (true, false, C::COMMENT),
            EdgeKind::MemberIsContainedIn => (true, false, C::FILE),
            EdgeKind::ScopeHasMember => (true, true, C::MEMBER),
            EdgeKind::ClassHasInitializer => (false, true, C::METHOD),
            EdgeKind::ClassIsSubclass => (true, false, C::TYPE),
            EdgeKind::MethodReturns => (false, false, C::TYPE),
            EdgeKind::MethodHasParameter => (true, true, C::PARAMETER),
            EdgeKind::MethodCalls => (true, false, C::METHOD_CALL),
            EdgeKind::MethodOverrides => (true, false, C::METHOD),
            EdgeKind::MethodThrows => (true, false, C::TYPE),
            EdgeKind::AttributeHasType => (false, false, C::TYPE),
            EdgeKind::ParameterHasType => (false, false, C::TYPE),
            EdgeKind::MethodCallMethod => (false, false, C::METHOD),
            EdgeKind::TypeHasTypeFormer => (true, false, C::TYPE_FORMER),
            EdgeKind::TypeFormerTypeRefersTo => (false, false, C::CLASS.union(C::SIMPLE_TYPE)),
            EdgeKind::ComponentContains => (true, false, C::COMPONENT),
            EdgeKind::FsContains => (true, true, C::FS_ENTRY),
            EdgeKind::FileHasComment => (true, false, C::COMMENT),
        };
        EdgeDesc { multi, containment, target }
    }

    pub fn is_containment(self) -> bool {
        self.desc().containment
    }

    /// Short relation name, e.g. `hasMember` or `overrides`.
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::MemberBelongsTo => "belongsTo",
            EdgeKind::MemberHasComment | EdgeKind::FileHasComment => "hasComment",
            EdgeKind::MemberIsContainedIn => "isContainedIn",
            EdgeKind::ScopeHasMember => "hasMember",
            EdgeKind::ClassHasInitializer => "hasInitializer",
            EdgeKind::ClassIsSubclass => "isSubclass",
            EdgeKind::MethodReturns => "returns",
            EdgeKind::MethodHasParameter => "hasParameter",
            EdgeKind::MethodCalls => "calls",
            EdgeKind::MethodOverrides => "overrides",
            EdgeKind::MethodThrows => "throws",
            EdgeKind::AttributeHasType | EdgeKind::ParameterHasType => "hasType",
            EdgeKind::MethodCallMethod => "method",
            EdgeKind::TypeHasTypeFormer => "hasTypeFormer",
            EdgeKind::TypeFormerTypeRefersTo => "refersTo",
            EdgeKind::ComponentContains | EdgeKind::FsContains => "contains",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Field groups ─────────────────────────────────────────

struct Group {
    attrs: &'static [AttrKind],
    positions: &'static [PosKind],
    edges: &'static [EdgeKind],
}

const EMPTY: Group = Group { attrs: &[], positions: &[], edges: &[] };

const NAMED: Group = Group { attrs: &[AttrKind::Name], ..EMPTY };

const MEMBER: Group = Group {
    attrs: &[AttrKind::Accessibility, AttrKind::IsStatic, AttrKind::IsCompilerGenerated],
    positions: &[PosKind::Position],
    edges: &[
        EdgeKind::MemberBelongsTo,
        EdgeKind::MemberHasComment,
        EdgeKind::MemberIsContainedIn,
    ],
};

const SCOPE: Group = Group { edges: &[EdgeKind::ScopeHasMember], ..EMPTY };

const CLASS: Group = Group {
    attrs: &[AttrKind::IsAbstract, AttrKind::Lloc],
    edges: &[EdgeKind::ClassHasInitializer, EdgeKind::ClassIsSubclass],
    ..EMPTY
};

const METHOD: Group = Group {
    attrs: &[AttrKind::IsAbstract, AttrKind::IsVirtual, AttrKind::NumberOfStatements],
    positions: &[PosKind::BodyPosition],
    edges: &[
        EdgeKind::MethodReturns,
        EdgeKind::MethodHasParameter,
        EdgeKind::MethodCalls,
        EdgeKind::MethodOverrides,
        EdgeKind::MethodThrows,
    ],
};

const ATTRIBUTE: Group = Group { edges: &[EdgeKind::AttributeHasType], ..EMPTY };

const PARAMETER: Group = Group {
    attrs: &[AttrKind::ParamKind],
    edges: &[EdgeKind::ParameterHasType],
    ..EMPTY
};

const METHOD_CALL: Group = Group { edges: &[EdgeKind::MethodCallMethod], ..EMPTY };

const TYPE: Group = Group {
    attrs: &[AttrKind::Spelling],
    edges: &[EdgeKind::TypeHasTypeFormer],
    ..EMPTY
};

const SIMPLE_TYPE: Group = Group { attrs: &[AttrKind::SimpleTypeKind], ..EMPTY };

const TYPE_FORMER_TYPE: Group = Group { edges: &[EdgeKind::TypeFormerTypeRefersTo], ..EMPTY };

const COMMENT: Group = Group {
    attrs: &[AttrKind::Text],
    positions: &[PosKind::Position],
    ..EMPTY
};

const COMPONENT: Group = Group { edges: &[EdgeKind::ComponentContains], ..EMPTY };

const FS_CONTAINER: Group = Group { edges: &[EdgeKind::FsContains], ..EMPTY };

const FILE: Group = Group {
    attrs: &[AttrKind::Loc, AttrKind::NumberOfComments],
    edges: &[EdgeKind::FileHasComment],
    ..EMPTY
};

fn groups(kind: NodeKind) -> &'static [Group] {
    const PACKAGE_G: &[Group] = &[NAMED, MEMBER, SCOPE];
    const CLASS_G: &[Group] = &[NAMED, MEMBER, SCOPE, CLASS];
    const METHOD_G: &[Group] = &[NAMED, MEMBER, SCOPE, METHOD];
    const ATTRIBUTE_G: &[Group] = &[NAMED, MEMBER, ATTRIBUTE];
    const PARAMETER_G: &[Group] = &[NAMED, PARAMETER];
    const METHOD_CALL_G: &[Group] = &[METHOD_CALL];
    const TYPE_G: &[Group] = &[TYPE];
    const SIMPLE_TYPE_G: &[Group] = &[SIMPLE_TYPE];
    const TYPE_FORMER_TYPE_G: &[Group] = &[TYPE_FORMER_TYPE];
    const TYPE_FORMER_ARRAY_G: &[Group] = &[];
    const COMMENT_G: &[Group] = &[COMMENT];
    const COMPONENT_G: &[Group] = &[NAMED, COMPONENT];
    const FILE_SYSTEM_G: &[Group] = &[NAMED, FS_CONTAINER];
    const FOLDER_G: &[Group] = &[NAMED, FS_CONTAINER];
    const FILE_G: &[Group] = &[NAMED, FILE];

    match kind {
        NodeKind::Package => PACKAGE_G,
        NodeKind::Class => CLASS_G,
        NodeKind::Method => METHOD_G,
        NodeKind::Attribute => ATTRIBUTE_G,
        NodeKind::Parameter => PARAMETER_G,
        NodeKind::MethodCall => METHOD_CALL_G,
        NodeKind::Type => TYPE_G,
        NodeKind::SimpleType => SIMPLE_TYPE_G,
        NodeKind::TypeFormerType => TYPE_FORMER_TYPE_G,
        NodeKind::TypeFormerArray => TYPE_FORMER_ARRAY_G,
        NodeKind::Comment => COMMENT_G,
        NodeKind::Component => COMPONENT_G,
        NodeKind::FileSystem => FILE_SYSTEM_G,
        NodeKind::Folder => FOLDER_G,
        NodeKind::File => FILE_G,
    }
}

// ── Flattened schema ─────────────────────────────────────

/// Flattened field layout of one node kind.
///
/// Single edges precede multi edges; within each, declaration order of
/// the groups is kept.
#[derive(Debug)]
pub struct KindSchema {
    pub kind: NodeKind,
    pub attrs: Vec<AttrKind>,
    pub positions: Vec<PosKind>,
    pub singles: Vec<EdgeKind>,
    pub multis: Vec<EdgeKind>,
}

impl KindSchema {
    pub fn attr_slot(&self, attr: AttrKind) -> Option<usize> {
        self.attrs.iter().position(|a| *a == attr)
    }

    pub fn position_slot(&self, pos: PosKind) -> Option<usize> {
        self.positions.iter().position(|p| *p == pos)
    }

    pub fn single_slot(&self, edge: EdgeKind) -> Option<usize> {
        self.singles.iter().position(|e| *e == edge)
    }

    pub fn multi_slot(&self, edge: EdgeKind) -> Option<usize> {
        self.multis.iter().position(|e| *e == edge)
    }

    /// All edges in traversal order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeKind> + '_ {
        self.singles.iter().chain(self.multis.iter()).copied()
    }
}

static SCHEMAS: OnceLock<Vec<KindSchema>> = OnceLock::new();

fn build_schemas() -> Vec<KindSchema> {
    NodeKind::ALL
        .iter()
        .map(|&kind| {
            let mut schema = KindSchema {
                kind,
                attrs: Vec::new(),
                positions: Vec::new(),
                singles: Vec::new(),
                multis: Vec::new(),
            };
            for group in groups(kind) {
                schema.attrs.extend_from_slice(group.attrs);
                schema.positions.extend_from_slice(group.positions);
                for &edge in group.edges {
                    if edge.desc().multi {
                        schema.multis.push(edge);
                    } else {
                        schema.singles.push(edge);
                    }
                }
            }
            schema
        })
        .collect()
}
