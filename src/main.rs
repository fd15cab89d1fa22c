use clap::{Parser, Subcommand, ValueEnum};
use image::{DynamicImage, RgbImage, RgbaImage};
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;
use webp_bridge::{
    ColorLayout, DecodedImage, EncodeOptions, Image, encode_to_file, get_features, plugin,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log native calls and rejected inputs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// RGBA when the input has an alpha channel, RGB otherwise
    Auto,
    Rgb,
    Rgba,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a WebP file to raw pixels or another format
    Decode {
        /// Input WebP file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (use extensions .jpg, .png for conversion, anything else for raw samples)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encode an image to WebP
    Encode {
        /// Input image file (supported: jpg, png, etc.)
        #[arg(short, long)]
        input: PathBuf,

        /// Output WebP file
        #[arg(short, long)]
        output: PathBuf,

        /// Quality factor (0-100)
        #[arg(short, long, default_value_t = plugin::DEFAULT_QUALITY)]
        quality: f32,

        /// Channel layout handed to the encoder
        #[arg(short, long, value_enum, default_value_t = Mode::Auto)]
        mode: Mode,
    },

    /// Display information about a WebP file
    Info {
        /// WebP file to inspect
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Decode { input, output } => decode_command(input, output)?,
        Commands::Encode {
            input,
            output,
            quality,
            mode,
        } => encode_command(input, output, quality, mode)?,
        Commands::Info { input } => info_command(input)?,
    }

    Ok(())
}

fn decode_command(
    input: PathBuf,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(&input)?;
    let decoded = plugin::open(&data)?;

    println!(
        "Decoded image: {}x{} {} ({})",
        decoded.width,
        decoded.height,
        decoded.layout,
        format_bytes(decoded.pixels.len())
    );

    if let Some(output_path) = output {
        let ext = output_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "jpg" | "jpeg" | "png" => {
                let img = to_dynamic_image(decoded)?;
                let format = if ext == "png" {
                    image::ImageFormat::Png
                } else {
                    image::ImageFormat::Jpeg
                };
                // JPEG has no alpha channel
                let img = if format == image::ImageFormat::Jpeg {
                    DynamicImage::ImageRgb8(img.to_rgb8())
                } else {
                    img
                };
                img.save_with_format(&output_path, format)?;
                println!("Image saved to: {}", output_path.display());
            }
            _ => {
                let mut file = std::fs::File::create(&output_path)?;
                file.write_all(&decoded.pixels)?;
                println!("Raw pixel data saved to: {}", output_path.display());
            }
        }
    }

    Ok(())
}

fn to_dynamic_image(decoded: DecodedImage) -> Result<DynamicImage, Box<dyn std::error::Error>> {
    let (width, height) = (decoded.width, decoded.height);
    let img = match decoded.layout {
        ColorLayout::Rgb => RgbImage::from_raw(width, height, decoded.pixels)
            .map(DynamicImage::ImageRgb8),
        ColorLayout::Rgba => RgbaImage::from_raw(width, height, decoded.pixels)
            .map(DynamicImage::ImageRgba8),
    };
    img.ok_or_else(|| "decoded buffer does not match its dimensions".into())
}

fn encode_command(
    input: PathBuf,
    output: PathBuf,
    quality: f32,
    mode: Mode,
) -> Result<(), Box<dyn std::error::Error>> {
    let img = image::open(&input)?;

    let layout = match mode {
        Mode::Auto if img.color().has_alpha() => ColorLayout::Rgba,
        Mode::Auto | Mode::Rgb => ColorLayout::Rgb,
        Mode::Rgba => ColorLayout::Rgba,
    };
    let (width, height) = (img.width(), img.height());
    let pixel_data = match layout {
        ColorLayout::Rgb => img.to_rgb8().into_raw(),
        ColorLayout::Rgba => img.to_rgba8().into_raw(),
    };

    let image = Image::packed(&pixel_data, width, height, layout);
    let encoded = encode_to_file(&image, &EncodeOptions { quality }, &output)?;

    println!(
        "Image encoded to WebP ({}): {} ({})",
        layout,
        output.display(),
        format_bytes(encoded.len())
    );

    Ok(())
}

fn info_command(input: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(&input)?;

    println!("File: {}", input.display());
    println!("File Size: {}", format_bytes(data.len()));
    if !plugin::accept(&data) {
        println!("Not a RIFF/WEBP file");
        return Ok(());
    }

    let features = get_features(&data)?;
    println!("Dimensions: {}x{}", features.width, features.height);
    println!("Has Alpha: {}", if features.has_alpha { "Yes" } else { "No" });
    println!("Animated: {}", if features.has_animation { "Yes" } else { "No" });
    println!("Format: {:?}", features.format);

    match plugin::open(&data) {
        Ok(decoded) => {
            println!(
                "Decoded Image Size: {} ({})",
                format_bytes(decoded.pixels.len()),
                decoded.layout
            );
        }
        Err(e) => {
            println!("Warning: Could not fully decode image: {}", e);
        }
    }

    Ok(())
}

// 1536 -> "1.50 KB"
fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 2] = ["KB", "MB"];

    let mut scaled = bytes as f64;
    let mut unit = None;
    for name in UNITS {
        if scaled < 1024.0 {
            break;
        }
        scaled /= 1024.0;
        unit = Some(name);
    }
    match unit {
        Some(name) => format!("{scaled:.2} {name}"),
        None => format!("{bytes} bytes"),
    }
}
