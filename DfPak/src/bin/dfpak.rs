fn main() -> anyhow::Result<()> {
    dfpak::cli::run_cli()
}
