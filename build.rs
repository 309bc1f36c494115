fn main() {
    // Codegen for the command-envelope RPC service. The message structs are
    // hand-written prost types in `src/rpc`, so no .proto file is needed.
    let service = tonic_build::manual::Service::builder()
        .name("CommandService")
        .package("orders.rpc")
        .method(
            tonic_build::manual::Method::builder()
                .name("dispatch")
                .route_name("Dispatch")
                .input_type("crate::rpc::CommandRequest")
                .output_type("crate::rpc::CommandResponse")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .build();

    tonic_build::manual::Builder::new().compile(&[service]);
}
