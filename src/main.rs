fn main() -> anyhow::Result<()> {
    venue_scout::cli::run()
}
