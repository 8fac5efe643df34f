fn main() {
    block_slider::run();
}
