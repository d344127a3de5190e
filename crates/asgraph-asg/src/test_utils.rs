//! Fixtures shared by the unit tests.

use crate::*;

/// Ids of the nodes built by [`sample_factory`].
pub struct Sample {
    pub package: NodeId,
    pub class: NodeId,
    pub m1: NodeId,
    pub m2: NodeId,
    pub param: NodeId,
    pub int_type: NodeId,
    pub simple: NodeId,
    pub former: NodeId,
    pub call: NodeId,
    pub unused_type: NodeId,
}

/// `pkg { class Shape { m1(p: int) ; m2 overrides m1, calls m1 } }`
/// plus one type nobody references.
pub fn sample_factory() -> (Factory, Sample) {
    let mut f = Factory::new();

    let package = f.create_node(NodeKind::Package);
    f.set_name(package, "pkg").unwrap();
    let class = f.create_node(NodeKind::Class);
    f.set_name(class, "Shape").unwrap();
    let m1 = f.create_node(NodeKind::Method);
    f.set_name(m1, "m1").unwrap();
    let m2 = f.create_node(NodeKind::Method);
    f.set_name(m2, "m2").unwrap();
    let param = f.create_node(NodeKind::Parameter);
    f.set_name(param, "p").unwrap();

    let simple = f.create_node(NodeKind::SimpleType);
    f.set_attr(simple, AttrKind::SimpleTypeKind, Value::Int(3)).unwrap();
    let former = f.create_node(NodeKind::TypeFormerType);
    f.set_edge(former, EdgeKind::TypeFormerTypeRefersTo, simple).unwrap();
    let int_type = f.create_node(NodeKind::Type);
    f.set_str(int_type, AttrKind::Spelling, "int").unwrap();
    f.add_edge(int_type, EdgeKind::TypeHasTypeFormer, former).unwrap();
    let call = f.create_node(NodeKind::MethodCall);
    f.set_edge(call, EdgeKind::MethodCallMethod, m1).unwrap();
    let unused_type = f.create_node(NodeKind::Type);
    f.set_str(unused_type, AttrKind::Spelling, "void").unwrap();

    f.add_edge(package, EdgeKind::ScopeHasMember, class).unwrap();
    f.add_edge(class, EdgeKind::ScopeHasMember, m1).unwrap();
    f.add_edge(class, EdgeKind::ScopeHasMember, m2).unwrap();
    f.add_edge(m1, EdgeKind::MethodHasParameter, param).unwrap();
    f.set_edge(param, EdgeKind::ParameterHasType, int_type).unwrap();
    f.add_edge(m2, EdgeKind::MethodOverrides, m1).unwrap();
    f.add_edge(m2, EdgeKind::MethodCalls, call).unwrap();

    let sample = Sample {
        package,
        class,
        m1,
        m2,
        param,
        int_type,
        simple,
        former,
        call,
        unused_type,
    };
    (f, sample)
}

pub fn trace_from(f: &Factory, start: Option<NodeId>, preorder: &Preorder) -> String {
    let mut trace = TraceVisitor::default();
    match start {
        Some(id) => preorder.run_from(f, id, &mut trace).unwrap(),
        None => preorder.run(f, &mut trace).unwrap(),
    };
    trace.into_output()
}
