use clap::Parser;
use image::imageops::{dither, FilterType};
use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tft_framebuffer::{
    BufferKind, Color, IndexedBuffer, PaletteMap, PixelBuffer, Rgb565Buffer, Rgb666Buffer,
};
use tracing::{debug, info};

/// Palette used for indexed output; 8 entries pack at 3 bits per pixel.
const PALETTE: [Color; 8] = [
    Color::BLACK,
    Color::WHITE,
    Color::rgb(255, 0, 0),
    Color::rgb(0, 255, 0),
    Color::rgb(0, 0, 255),
    Color::rgb(255, 255, 0),
    Color::rgb(0, 255, 255),
    Color::rgb(255, 0, 255),
];

#[derive(Debug, Copy, Clone, clap::ValueEnum)]
enum Format {
    Rgb565,
    Rgb666,
    Indexed,
}

#[derive(Debug, Parser)]
struct Args {
    file: PathBuf,
    out_file: PathBuf,
    #[clap(long, value_enum, default_value_t = Format::Rgb565)]
    format: Format,
    #[clap(long, default_value_t = 128)]
    width: u16,
    #[clap(long, default_value_t = 160)]
    height: u16,
    /// right-justify 565/666 values instead of bus-aligning them
    #[clap(long)]
    right_bit_aligned: bool,
    /// save the dithered preview (indexed format only)
    #[clap(long)]
    dithered_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let img = image::open(&args.file)?;
    let img = img.resize_to_fill(
        u32::from(args.width),
        u32::from(args.height),
        FilterType::Lanczos3,
    );
    let mut img = img.into_rgb8();
    info!(
        "Opened {} as {}x{} rgb",
        args.file.display(),
        args.width,
        args.height
    );

    let mut buffer: Box<dyn PixelBuffer> = match args.format {
        Format::Rgb565 => Box::new(Rgb565Buffer::new()),
        Format::Rgb666 => Box::new(Rgb666Buffer::new()),
        Format::Indexed => Box::new(IndexedBuffer::new(PALETTE.to_vec())),
    };
    buffer.set_right_bit_aligned(args.right_bit_aligned);
    buffer.init(args.width, args.height)?;

    if matches!(args.format, Format::Indexed) {
        let map = PaletteMap::new(&PALETTE);
        dither(&mut img, &map);
        info!("Dithered to the {} entry palette", PALETTE.len());
        if let Some(path) = &args.dithered_file {
            img.save(path)?;
            info!("Saved dithered preview to {}", path.display());
        }
    }

    for (x, y, pixel) in img.enumerate_pixels() {
        buffer.set_pixel(x as u16, y as u16, Color::rgb(pixel.0[0], pixel.0[1], pixel.0[2]));
    }
    info!(
        "Rendered {} pixels into a {} buffer ({} bytes)",
        buffer.buffer_length(),
        buffer.kind(),
        buffer.buffer_size()
    );

    debug!("dirty window {:?}", buffer.dirty_window());
    let bytes = dirty_window_bytes(buffer.as_ref());
    buffer.reset_dirty();

    let mut out = File::create(&args.out_file)?;
    out.write_all(&bytes)?;
    info!("Wrote {} bytes to {}", bytes.len(), args.out_file.display());
    Ok(())
}

/// Walk the dirty window row-major the way a windowed driver readout does
/// and emit device-order bytes: big-endian 565, or three bytes per pixel
/// for 666.
fn dirty_window_bytes(buffer: &dyn PixelBuffer) -> Vec<u8> {
    let window = buffer.dirty_window();
    if window.is_empty() {
        return Vec::new();
    }
    let row_stride = usize::from(buffer.width());
    let start = usize::from(window.y_low()) * row_stride + usize::from(window.x_low());
    let mut bytes = Vec::new();
    for row in 0..usize::from(window.height()) {
        for col in 0..usize::from(window.width()) {
            let pos = start + row * row_stride + col;
            match buffer.kind() {
                BufferKind::Rgb666 => {
                    let color = buffer.pixel_to_666_at(pos);
                    bytes.push((color >> 16) as u8);
                    bytes.push((color >> 8) as u8);
                    bytes.push(color as u8);
                }
                _ => {
                    let color = buffer.pixel_to_565_at(pos);
                    bytes.push((color >> 8) as u8);
                    bytes.push(color as u8);
                }
            }
        }
    }
    bytes
}
