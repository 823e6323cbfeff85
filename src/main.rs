fn main() {
    #[cfg(feature = "cli")]
    seqdelta::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("seqdelta: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
