use console::Style;
use ndfolder_core::consts::OVERLAY_TIME_FORMAT;
use ndfolder_core::experiment::julian_day_to_datetime;
use ndfolder_core::pipeline::LoadedFolder;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn format_julian(jd: f64) -> String {
    julian_day_to_datetime(jd)
        .map(|t| t.format(OVERLAY_TIME_FORMAT).to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn print_folder_summary(folder: &LoadedFolder) {
    let s = Styles::new();
    let shape = folder.stack.shape();

    println!();
    println!("  {}", s.title.apply_to("Acquisition Folder"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(18)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Folder"),
        s.path.apply_to(folder.root.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Shape"),
        s.value.apply_to(shape)
    );
    println!();

    // Files
    println!("  {}", s.header.apply_to("Files"));
    for (i, (name, stack)) in folder.files.iter().zip(folder.stack.stacks()).enumerate() {
        let missing = stack.channel_map().missing();
        let note = if missing.is_empty() {
            String::new()
        } else {
            let names: Vec<&str> = missing
                .iter()
                .map(|&c| folder.canonical.channel_names[c].as_str())
                .collect();
            format!("  missing {}", names.join(", "))
        };
        println!(
            "    {}. {}  {}{}",
            s.label.apply_to(i + 1),
            s.path.apply_to(name),
            s.value.apply_to(format!("{} timepoints", stack.shape().time)),
            s.disabled.apply_to(note)
        );
    }
    println!();

    // Channels
    println!("  {}", s.header.apply_to("Channels"));
    for layer in &folder.layers {
        println!(
            "    {:<12}{}  {}",
            s.label.apply_to(&layer.name),
            s.method.apply_to(layer.color),
            s.value.apply_to(format!("opacity {:.1}", layer.opacity))
        );
    }
    println!();

    // Positions
    println!("  {}", s.header.apply_to("Positions"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Labels"),
        s.value.apply_to(folder.labels.join(", "))
    );
    println!();

    // Time
    let known: Vec<f64> = folder.times.iter().copied().filter(|&v| v > 0.0).collect();
    println!("  {}", s.header.apply_to("Time"));
    if known.is_empty() {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Range"),
            s.disabled.apply_to("no timestamps")
        );
    } else {
        let first = known.iter().copied().fold(f64::INFINITY, f64::min);
        let last = known.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        println!(
            "    {:<12}{}",
            s.label.apply_to("First"),
            s.value.apply_to(format_julian(first))
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Last"),
            s.value.apply_to(format_julian(last))
        );
        let unknown = folder.times.len() - known.len();
        if unknown > 0 {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Unknown"),
                s.disabled.apply_to(format!("{unknown} cells"))
            );
        }
    }
    println!();

    // Experiment
    match folder.experiment {
        Some(ref info) => {
            println!("  {}", s.header.apply_to("Experiment"));
            for (label, channel) in &info.channel_infos {
                let abx = channel
                    .antibiotic
                    .as_ref()
                    .map(|a| format!("{} {} {}", a.name, a.concentration, a.concentration_unit))
                    .unwrap_or_else(|| "no antibiotic".to_string());
                println!(
                    "    {:<12}{}",
                    s.label.apply_to(label),
                    s.value.apply_to(abx)
                );
            }
        }
        None => println!(
            "  {:<14}{}",
            s.header.apply_to("Experiment"),
            s.disabled.apply_to("none")
        ),
    }
    println!();
}
