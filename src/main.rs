fn main() {
    #[cfg(feature = "cli")]
    imgpatch::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("imgpatch: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
