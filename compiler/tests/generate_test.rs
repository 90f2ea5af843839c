#![cfg(test)]

use wl_gena_compiler::{
    compile_header, compile_protocol,
    error::GenaError,
    gen_cpp::TypeTable,
    order_interfaces, protocol_to_json,
    resolver::Namespaces,
    wire_signature, GenerateOptions,
};

const CANVAS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<protocol name="demo">
  <interface name="demo_canvas" version="2">
    <request name="create_shape">
      <arg name="id" type="new_id" interface="demo_shape"/>
      <arg name="kind" type="uint" enum="demo_shape.kind"/>
    </request>
    <request name="attach">
      <arg name="shape" type="object" interface="demo_shape" allow-null="true"/>
      <arg name="x" type="int"/>
      <arg name="y" type="int"/>
    </request>
    <request name="destroy" type="destructor"/>
    <event name="resized" since="2">
      <arg name="width" type="int"/>
      <arg name="height" type="int"/>
      <arg name="scale" type="fixed"/>
    </event>
  </interface>
  <interface name="demo_shape" version="1">
    <enum name="kind">
      <entry name="circle" value="0"/>
      <entry name="rect" value="1"/>
    </enum>
    <request name="set_label">
      <arg name="label" type="string" allow-null="true"/>
    </request>
    <request name="destroy" type="destructor"/>
    <event name="hit">
      <arg name="serial" type="uint"/>
    </event>
  </interface>
</protocol>
"#;

#[test]
fn test_parse_canvas() {
    let protocol = compile_protocol(CANVAS).expect("compile_protocol failed");

    assert_eq!(protocol.name, "demo");
    assert_eq!(protocol.interfaces.len(), 2);

    let canvas = &protocol.interfaces[0];
    assert_eq!(canvas.name, "demo_canvas");
    assert_eq!(canvas.version, 2);
    assert_eq!(canvas.requests.len(), 3);
    assert!(canvas.requests[2].is_destructor());
    assert_eq!(canvas.events[0].since, Some(2));

    let signatures: Vec<String> = canvas.messages().map(wire_signature).collect();
    assert_eq!(signatures, vec!["iu", "?oii", "", "2iif"]);

    let shape = &protocol.interfaces[1];
    assert_eq!(shape.enums[0].entries.len(), 2);
    assert_eq!(shape.enum_providers(), Vec::<&str>::new());
    assert_eq!(canvas.enum_providers(), vec!["demo_shape"]);
}

#[test]
fn test_providers_come_first() {
    let protocol = compile_protocol(CANVAS).unwrap();
    let namespaces = Namespaces::new(&protocol, &[], None).unwrap();
    let ordered = order_interfaces(&protocol, &namespaces).unwrap();
    let order: Vec<&str> = ordered.iter().map(|iface| iface.name.as_str()).collect();
    assert_eq!(order, vec!["demo_shape", "demo_canvas"]);
}

#[test]
fn test_unrelated_interfaces_keep_document_order() {
    let protocol = compile_protocol(
        r#"<protocol name="p">
  <interface name="first" version="1"/>
  <interface name="second" version="1"/>
  <interface name="third" version="1"/>
</protocol>"#,
    )
    .unwrap();
    let namespaces = Namespaces::new(&protocol, &[], None).unwrap();
    let ordered = order_interfaces(&protocol, &namespaces).unwrap();
    let order: Vec<&str> = ordered.iter().map(|iface| iface.name.as_str()).collect();
    assert_eq!(order, vec!["first", "second", "third"]);
}

#[test]
fn test_type_table_layout() {
    let protocol = compile_protocol(CANVAS).unwrap();
    let namespaces = Namespaces::new(&protocol, &[], None).unwrap();
    let ordered = order_interfaces(&protocol, &namespaces).unwrap();
    let table = TypeTable::new(&ordered, &namespaces).unwrap();

    // demo_canvas.resized has the longest argument list without objects.
    assert_eq!(table.null_run(), 3);
    // demo_canvas is emitted second.
    assert_eq!(table.offset(1, false, 0), 3);
    assert_eq!(table.offset(1, false, 1), 5);
    assert_eq!(table.offset(1, false, 2), 0);
    assert_eq!(table.offset(1, true, 0), 0);
    assert_eq!(table.offset(0, false, 0), 0);
}

#[test]
fn test_full_header() {
    let options = GenerateOptions::new()
        .include("/cstdint")
        .include("demo_traits.hh")
        .namespace("wl");
    let header = compile_header(CANVAS, &options).expect("compile_header failed");

    assert!(
        header.starts_with(
            "#pragma once\n\
             \n\
             #include <cstdint>\n\
             #include \"demo_traits.hh\"\n\
             \n\
             namespace wl {\n\
             namespace demo {\n\
             \n\
             template <typename demo_shape_traits> struct demo_shape;\n\
             template <typename demo_canvas_traits> struct demo_canvas;\n\
             \n\
             template <typename traits>\n\
             struct rtti\n\
             {\n"
        ),
        "{}",
        header
    );
    assert!(header.ends_with("};\n\n} // namespace demo\n} // namespace wl\n"), "{}", header);

    // Interfaces appear providers first.
    let shape = header.find("struct demo_shape\n{").expect("demo_shape missing");
    let canvas = header.find("struct demo_canvas\n{").expect("demo_canvas missing");
    assert!(shape < canvas);

    assert!(header.contains("/*\n * Dependencies:\n * [demo_shape]\n */\ntemplate <typename demo_canvas_traits>\nstruct demo_canvas\n"), "{}", header);
    assert!(header.contains("        typename ::wl::demo::demo_shape<demo_canvas_traits>::kind_e kind\n"), "{}", header);
    assert!(header.contains("        &::wl::demo::rtti<demo_canvas_traits>::demo_shape_interface,\n"), "{}", header);

    assert!(header.contains("    &::wl::demo::rtti<traits>::demo_shape_interface, /* [3][demo_canvas.create_shape.id] */\n"), "{}", header);
    assert!(header.contains("    {\"create_shape\", \"iu\", rtti<traits>::types + /* [demo_canvas.create_shape] */ 3},\n"), "{}", header);
    assert!(header.contains("    {\"attach\", \"?oii\", rtti<traits>::types + /* [demo_canvas.attach] */ 5},\n"), "{}", header);
    assert!(header.contains("    {\"destroy\", \"\", rtti<traits>::types + /* [null_run_stub] */ 0}\n"), "{}", header);
    assert!(header.contains("    {\"resized\", \"2iif\", rtti<traits>::types + /* [null_run_stub] */ 0}\n"), "{}", header);
    assert!(header.contains(
        "const typename traits::wl_interface_t rtti<traits>::demo_canvas_interface = {\n    \"demo_canvas\", 2,\n    3, rtti<traits>::demo_canvas_requests,\n    1, rtti<traits>::demo_canvas_events\n};\n"
    ), "{}", header);
}

#[test]
fn test_multiple_new_ids_skip_request() {
    let header = compile_header(
        r#"<protocol name="p">
  <interface name="pair" version="1">
    <request name="split">
      <arg name="left" type="new_id" interface="pair"/>
      <arg name="right" type="new_id" interface="pair"/>
    </request>
  </interface>
</protocol>"#,
        &GenerateOptions::new(),
    )
    .unwrap();

    assert!(header.contains(
        "    /*\n     * Multiple new_id args: Ignore [split] request generation\n     * new_id[0] left\n     * new_id[1] right\n     */\n"
    ), "{}", header);
    assert!(!header.contains(" split("), "{}", header);
}

#[test]
fn test_enum_cycle() {
    let err = compile_header(
        r#"<protocol name="p">
  <interface name="A" version="1">
    <enum name="e"/>
    <request name="r"><arg name="v" type="uint" enum="B.e"/></request>
  </interface>
  <interface name="B" version="1">
    <enum name="e"/>
    <event name="v"><arg name="v" type="uint" enum="A.e"/></event>
  </interface>
</protocol>"#,
        &GenerateOptions::new(),
    )
    .unwrap_err();

    match &err {
        GenaError::Cycle(names) => assert_eq!(names, &vec!["A".to_string(), "B".to_string()]),
        other => panic!("expected a cycle, got {:?}", other),
    }
    assert_eq!(err.to_string(), "interfaces [A, B] involved in a cycle(s)");
}

#[test]
fn test_context_documents() {
    let core = compile_protocol(
        r#"<protocol name="core">
  <interface name="demo_shape" version="1"/>
</protocol>"#,
    )
    .unwrap();

    let err = compile_header(CANVAS, &GenerateOptions::new().context(core)).unwrap_err();
    match err {
        GenaError::DuplicateInterface { interface, first, second } => {
            assert_eq!(interface, "demo_shape");
            assert_eq!(first, "demo");
            assert_eq!(second, "core");
        }
        other => panic!("expected a duplicate interface, got {:?}", other),
    }
}

#[test]
fn test_unknown_interface() {
    let err = compile_header(
        r#"<protocol name="p">
  <interface name="a" version="1">
    <request name="r"><arg name="o" type="object" interface="nowhere"/></request>
  </interface>
</protocol>"#,
        &GenerateOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, GenaError::UnknownInterface(ref name) if name == "nowhere"), "{:?}", err);
}

#[test]
fn test_parse_error_position() {
    let err = compile_protocol("<protocol name=\"p\">\n  <interface version=\"1\"/>\n</protocol>").unwrap_err();
    match err {
        GenaError::ParseError { line, column, .. } => assert_eq!((line, column), (2, 3)),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn test_wl_strip_json() {
    let protocol = compile_protocol(
        r#"<protocol name="wl_core">
  <interface name="wl_surface" version="1">
    <request name="attach"><arg name="buffer" type="object" interface="wl_buffer"/></request>
  </interface>
  <interface name="wl_buffer" version="1"/>
</protocol>"#,
    )
    .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&protocol_to_json(&protocol.strip_wl_prefix()).unwrap()).unwrap();
    assert_eq!(json["name"], "core");
    assert_eq!(json["interfaces"][0]["name"], "surface");
    assert_eq!(json["interfaces"][0]["requests"][0]["args"][0]["type"]["interface"], "buffer");
    assert_eq!(json["interfaces"][1]["name"], "buffer");
}
