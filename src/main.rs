fn main() {
    pushdown::cli::run();
}
