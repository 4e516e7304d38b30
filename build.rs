fn main() {
    // Rebuild if the collision kernel changes
    println!("cargo:rerun-if-changed=shaders/mesh_collision.wgsl");
}
