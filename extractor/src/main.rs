use extractor::cli::{CliArgs, USAGE};
use extractor::{ClipStatus, ExtractionParams, FrameExtractor, ProductListing};
use logging::{LogLevel, Logger};
use std::process;

fn main() {
    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };

    if args.help {
        println!("{}", USAGE);
        return;
    }

    let params = match args.params() {
        Ok(params) => params,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    let logger = initialize_logger(&args);
    let extractor = FrameExtractor::new(&args.clips_dir, &args.frames_dir, &logger)
        .with_expected_devices(&args.cameras);

    let code = if args.list {
        run_list(&extractor)
    } else {
        run_extract(&extractor, &params, args.force)
    };

    let _ = logger.flush();
    process::exit(code);
}

/// Console logger, also writing to `--log-file` when given
fn initialize_logger(args: &CliArgs) -> Logger {
    let Some(path) = &args.log_file else {
        return Logger::detached(LogLevel::Info, true);
    };

    match Logger::with_component(path, LogLevel::Info, Some("extract-frames"), true) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path.display(), e);
            eprintln!("Logging to console only.");
            Logger::detached(LogLevel::Info, true)
        }
    }
}

fn run_list(extractor: &FrameExtractor) -> i32 {
    match extractor.list_available_clips() {
        Ok(products) if products.is_empty() => {
            println!(
                "No complete clip groups found in {} (cameras {:?})",
                extractor.clips_dir().display(),
                extractor.expected_devices()
            );
            0
        }
        Ok(products) => {
            println!("Available clips by product:");
            products.iter().for_each(print_product);
            0
        }
        Err(e) => {
            eprintln!("Could not list clips: {}", e);
            1
        }
    }
}

fn print_product(product: &ProductListing) {
    let status = if product.processed { "processed" } else { "pending" };
    println!(
        "\n{} ({} group(s), {})",
        product.product,
        product.groups.len(),
        status
    );

    for group in &product.groups {
        println!("  {}:", group.timestamp);
        for clip in &group.clips {
            match &clip.status {
                ClipStatus::Readable {
                    frame_count,
                    duration_secs,
                    ..
                } => println!(
                    "    Cam {}: {:.1}s ({} frames)",
                    clip.device_id, duration_secs, frame_count
                ),
                ClipStatus::Unreadable(reason) => {
                    println!("    Cam {}: unreadable ({})", clip.device_id, reason)
                }
            }
        }
    }
}

fn run_extract(extractor: &FrameExtractor, params: &ExtractionParams, force: bool) -> i32 {
    let report = match extractor.extract_all_clips(params, force) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Extraction failed: {}", e);
            return 1;
        }
    };

    println!("\nSummary:");
    println!("  Products found:      {}", report.products_found);
    println!("  Already processed:   {}", report.skipped.len());
    println!("  Groups extracted:    {}", report.groups_extracted);
    println!("  Groups failed:       {}", report.groups_failed);
    println!("  Products unreadable: {}", report.products_failed.len());
    println!("  Frame bundles:       {}", report.bundles_extracted);
    println!("  Products completed:  {}", report.products_marked.len());
    println!(
        "  Layout:              {}/<product>/cam<id>/",
        extractor.frames_dir().display()
    );

    if !report.skipped.is_empty() {
        println!("\nSkipped: {}", report.skipped.join(", "));
        println!("Delete a product's .processed file or pass --force to extract it again.");
    }

    if !report.products_failed.is_empty() {
        println!("\nCould not scan: {}", report.products_failed.join(", "));
    }

    if report.groups_failed > 0 || !report.products_failed.is_empty() { 1 } else { 0 }
}
