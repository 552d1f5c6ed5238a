fn main() {
    mediaforge::app::cli::run();
}
