use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use dendro::canvas::{self, SvgOptions};
use dendro::dendrogram::{render, DendrogramConfig, TreeNode};
use dendro::theme::Theme;
use log::info;
use resvg::usvg;
use std::path::PathBuf;
use tiny_skia::{Pixmap, Transform};

/// Dendrogram renderer for hierarchical clustering results
#[derive(Parser, Debug)]
#[command(name = "dendro")]
#[command(version)]
#[command(about = "Render a clustering tree (JSON) to SVG, PNG or PDF", long_about = None)]
struct Args {
    /// Input JSON tree (use "-" for stdin)
    #[arg(value_name = "INPUT", required_unless_present = "completions")]
    input: Option<PathBuf>,

    /// Output file path (extension determines format: .svg, .png or .pdf)
    #[arg(short, long, value_name = "OUTPUT", required_unless_present = "completions")]
    output: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 420.0)]
    width: f32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 320.0)]
    height: f32,

    /// Color sub-trees that merge at or below this height
    #[arg(long, value_name = "HEIGHT")]
    cut_height: Option<f32>,

    /// Skip leaf labels (also shrinks the reserved bottom margin)
    #[arg(long)]
    hide_labels: bool,

    /// Axis title
    #[arg(long, default_value = "↑ Height")]
    y_label: String,

    /// Left margin shared by the axis and the first leaf
    #[arg(long, default_value_t = 30.0)]
    padding_left: f32,

    /// Override the bottom margin (default depends on --hide-labels)
    #[arg(long, value_name = "PIXELS")]
    padding_bottom: Option<f32>,

    /// Comma-separated palette for cut sub-trees
    #[arg(long, value_delimiter = ',', value_name = "COLOR,...")]
    colors: Vec<String>,

    /// Stroke color for uncut links
    #[arg(long, default_value = "grey")]
    link_color: String,

    /// Label and tick font family
    #[arg(long, default_value = "Inter, sans-serif")]
    font_family: String,

    /// Label and tick font size
    #[arg(long, default_value_t = 10.0)]
    font_size: f32,

    /// Link stroke width
    #[arg(long, default_value_t = 1.0)]
    stroke_width: f32,

    /// Path to an Alacritty theme file (YAML or TOML)
    #[arg(short, long, value_name = "THEME")]
    theme: Option<PathBuf>,

    /// Raster scale multiplier for PNG output
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,

    /// Verbosity (0 = warnings, 1 = info, 2+ = debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), String> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "dendro", &mut std::io::stdout());
        return Ok(());
    }

    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    let theme = if let Some(ref theme_path) = args.theme {
        if theme_path.exists() && theme_path.is_file() {
            let content = std::fs::read_to_string(theme_path)
                .map_err(|e| format!("Failed to read theme file: {}", e))?;

            // Try TOML first (since Alacritty is moving to TOML), then YAML
            if let Ok(theme) = Theme::from_alacritty_toml(&content) {
                theme
            } else if let Ok(theme) = Theme::from_alacritty_yaml(&content) {
                theme
            } else {
                return Err("Failed to parse theme file as TOML or YAML".to_string());
            }
        } else {
            return Err(format!("Theme file not found: {}", theme_path.display()));
        }
    } else {
        Theme::default()
    };

    let input = args
        .input
        .as_ref()
        .ok_or_else(|| "INPUT is required".to_string())?;
    let source = if input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(input).map_err(|e| format!("Failed to read input file: {}", e))?
    };

    let tree = TreeNode::from_json(&source).map_err(|e| e.to_string())?;

    let mut config = DendrogramConfig {
        width: args.width,
        height: args.height,
        hide_labels: args.hide_labels,
        padding_bottom: args.padding_bottom,
        padding_left: args.padding_left,
        cut_height: args.cut_height,
        y_label: args.y_label.clone(),
        link_color: args.link_color.clone(),
        font_family: args.font_family.clone(),
        font_size: args.font_size,
        stroke_width: args.stroke_width,
        ..DendrogramConfig::default()
    };
    if !args.colors.is_empty() {
        config.colors = args.colors.clone();
    }

    let commands = render(&tree, &config).map_err(|e| e.to_string())?;
    info!(
        "rendered {} leaves as {} draw commands",
        tree.leaf_count(),
        commands.len()
    );

    let svg = canvas::write_svg(
        &commands,
        &SvgOptions {
            background: Some(theme.background_color.clone()),
            color: Some(theme.text_color.clone()),
        },
    );

    let output = args
        .output
        .as_ref()
        .ok_or_else(|| "OUTPUT is required".to_string())?;
    let output_ext = output
        .extension()
        .and_then(|e| e.to_str())
        .ok_or("Output file has no extension")?
        .to_ascii_lowercase();

    match output_ext.as_str() {
        "svg" => {
            std::fs::write(output, &svg).map_err(|e| format!("Failed to write SVG: {}", e))?;
            eprintln!("SVG saved to: {}", output.display());
        }
        "png" => {
            let png_data = svg_to_png(&svg, args.png_scale)?;
            std::fs::write(output, png_data)
                .map_err(|e| format!("Failed to write PNG: {}", e))?;
            eprintln!("PNG saved to: {}", output.display());
        }
        "pdf" => {
            let pdf_data = svg_to_pdf(&svg)?;
            std::fs::write(output, pdf_data)
                .map_err(|e| format!("Failed to write PDF: {}", e))?;
            eprintln!("PDF saved to: {}", output.display());
        }
        _ => {
            return Err(format!(
                "Unsupported output format: .{} (use .svg, .png or .pdf)",
                output_ext
            ));
        }
    }

    Ok(())
}

fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, String> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("Invalid --png-scale value: {}", scale));
    }

    let mut opts = usvg::Options::default();
    opts.fontdb_mut().load_system_fonts();

    let tree =
        usvg::Tree::from_str(svg, &opts).map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(width, height).ok_or("Failed to create pixmap")?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| format!("Failed to encode PNG: {}", e))
}

fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, String> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();

    let opts = svg2pdf::usvg::Options {
        fontdb: std::sync::Arc::new(fontdb),
        ..Default::default()
    };

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| format!("Failed to parse SVG: {}", e))?;

    // Keep text as paths for broader viewer/font compatibility.
    let options = svg2pdf::ConversionOptions {
        embed_text: false,
        ..Default::default()
    };

    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default())
        .map_err(|e| format!("Failed to convert SVG to PDF: {}", e))
}
