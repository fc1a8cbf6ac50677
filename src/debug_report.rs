use colloquy::{LoadReport, MatchResult, SortMetrics, SortedTrigger};
use std::time::Duration;

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

/// Everything one CLI run produced.
pub struct Run<'a> {
    pub topic: &'a str,
    pub input: &'a str,
    pub loads: &'a [(String, LoadReport)],
    pub metrics: &'a SortMetrics,
    pub sorted: &'a [SortedTrigger],
    pub result: Option<&'a MatchResult>,
    pub match_time: Duration,
}

pub fn print_run(run: &Run<'_>, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Matching: \"{}\" in topic '{}'", run.input, run.topic), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Scripts ━━━", ansi::GRAY));
    print_loads(run.loads, &palette);

    println!("\n{}", palette.paint("━━━ Sort ━━━", ansi::GRAY));
    print_sort(run.topic, run.metrics, &palette);

    println!("\n{}", palette.paint(format!("━━━ Sorted triggers ({}) ━━━", run.topic), ansi::GRAY));
    print_sorted(run.sorted, &palette);

    println!("\n{}", palette.paint("━━━ Result ━━━", ansi::GRAY));
    match run.result {
        Some(result) => print_result(result, &palette),
        None => {
            println!("{}", palette.dim("  No trigger matched"));
            println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
            println!("  • No trigger in the topic (or its includes/inherits) covers every word");
            println!("  • '_' and '#' wildcards only take letters and digits respectively");
            println!("  • An array referenced by the pattern is undefined");
            println!("\n{}", palette.dim("  Tip: Set RUST_LOG=colloquy=trace to see every attempted trigger"));
        }
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Sort: {}  │  Match: {}",
        palette.paint(format!("{:?}", run.metrics.total), ansi::CYAN),
        palette.paint(format!("{:?}", run.match_time), ansi::GREEN),
    );
    println!();
}

fn print_loads(loads: &[(String, LoadReport)], palette: &ansi::Palette) {
    if loads.is_empty() {
        println!("  {}", palette.dim("No scripts loaded"));
        return;
    }
    for (path, report) in loads {
        let version = report.version.map(|v| format!("v{v}")).unwrap_or_else(|| "unversioned".to_string());
        println!(
            "  {} {} {}",
            palette.paint(path, ansi::BLUE),
            palette.dim(version),
            palette.paint(format!("✓ {} triggers", report.triggers), ansi::GREEN),
        );
        for err in &report.rejected {
            println!("    {} {}", palette.paint("✗", ansi::RED), err);
        }
        for warning in &report.warnings {
            println!("    {} {}", palette.paint("!", ansi::YELLOW), palette.dim(warning));
        }
    }
}

fn print_sort(topic: &str, metrics: &SortMetrics, palette: &ansi::Palette) {
    println!(
        "  {} topics sorted",
        palette.paint(metrics.topics.len().to_string(), ansi::BLUE),
    );
    if let Some(t) = metrics.topic(topic) {
        println!(
            "  {} {} triggers  {} {} %previous  {} {} duplicates",
            palette.paint(topic, ansi::CYAN),
            palette.paint(t.triggers.to_string(), ansi::GREEN),
            palette.dim("│"),
            palette.paint(t.previous.to_string(), ansi::GREEN),
            palette.dim("│"),
            palette.paint(t.duplicates.to_string(), ansi::YELLOW),
        );
    }
    for t in &metrics.topics {
        for issue in &t.issues {
            println!("  {} {}: {:?}", palette.paint("✗", ansi::RED), palette.paint(&t.topic, ansi::BLUE), issue);
        }
    }
}

fn print_sorted(sorted: &[SortedTrigger], palette: &ansi::Palette) {
    if sorted.is_empty() {
        println!("  {}", palette.dim("(empty)"));
        return;
    }
    for (idx, entry) in sorted.iter().take(20).enumerate() {
        let previous = entry.previous.as_deref().map(|p| format!(" % {p}")).unwrap_or_default();
        println!(
            "  {} {}{} {} {}",
            palette.paint(format!("[{idx}]"), ansi::GRAY),
            palette.paint(&entry.pattern, ansi::GREEN),
            palette.dim(previous),
            palette.dim("│"),
            palette.paint(format!("{} depth {}", entry.owner, entry.depth), ansi::YELLOW),
        );
    }
    if sorted.len() > 20 {
        println!("  {}", palette.dim(format!("... +{} more", sorted.len() - 20)));
    }
}

fn print_result(result: &MatchResult, palette: &ansi::Palette) {
    println!(
        "  {} {} {}",
        palette.bold(palette.paint(&result.pattern, ansi::GREEN)),
        palette.dim("│"),
        palette.paint(format!("owner {} depth {}", result.owner, result.depth), ansi::YELLOW),
    );
    if let Some(previous) = &result.previous {
        println!("      {} {}", palette.dim("%previous:"), palette.paint(previous, ansi::CYAN));
    }
    for (idx, capture) in result.captures.iter().enumerate() {
        println!("      {} {}", palette.dim(format!("<star{}>", idx + 1)), palette.paint(capture, ansi::BLUE));
    }
    for (idx, capture) in result.previous_captures.iter().enumerate() {
        println!("      {} {}", palette.dim(format!("<botstar{}>", idx + 1)), palette.paint(capture, ansi::BLUE));
    }
    for response in &result.responses {
        println!("      {} {}", palette.dim("-"), response);
    }
}
