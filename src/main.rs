fn main() {
    std::process::exit(productividad_app_lib::run());
}
