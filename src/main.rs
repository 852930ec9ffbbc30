fn main() -> color_eyre::Result<()> {
    spiterm::run()
}
