fn main() {
    println!("cargo:rerun-if-changed=schemas/catalog.graphql");

    cynic_codegen::register_schema("catalog")
        .from_sdl_file("schemas/catalog.graphql")
        .unwrap()
        .as_default()
        .unwrap();
}
