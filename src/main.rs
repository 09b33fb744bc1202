fn main() {
    std::process::exit(branch_diagram_renderer::run());
}
