// example/src/main.rs

use wl_gena::*;

/// Protocol bundled with the example.
const DEMO: &str = include_str!("../protocols/demo.xml");

fn main() -> Result<(), GenaError> {
    // 1) Parse the XML into the data model.
    let protocol = compile_protocol(DEMO)?;
    for iface in &protocol.interfaces {
        println!(
            "{} v{}: {} request(s), {} event(s), {} enum(s)",
            iface.name,
            iface.version,
            iface.requests.len(),
            iface.events.len(),
            iface.enums.len()
        );
    }

    // 2) The same tree as JSON.
    println!("\n{}", xml_to_json(DEMO)?);

    // 3) The C++ bindings. `demo_shape` owns the enum `demo_canvas` uses, so
    //    it is emitted first.
    let options = GenerateOptions::new()
        .include("/cstddef")
        .include("/cstdint")
        .namespace("examples");
    let header = generate_header(&protocol, &options)?;
    println!("{}", header);

    // 4) The dependency graph behind that ordering.
    print!("{}", dependency_dot(&protocol, &[])?);
    Ok(())
}
