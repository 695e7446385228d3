use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use image::GrayImage;
use localthresh::{
    FOREGROUND, Image, SauvolaBinarizer, SauvolaMaps, SauvolaParams, min_max, normalize_to_u8,
    to_f64, to_u8_saturating,
};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "localthresh")]
#[command(about = "Binarize images with a Sauvola local adaptive threshold")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Threshold an image and save the 0/255 result as PNG.
    #[command(name = "binarize")]
    Binarize(BinarizeArgs),
    /// Threshold an image and dump every intermediate grid.
    #[command(name = "inspect")]
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
struct ParamArgs {
    /// Disk window radius in pixels [default: 5]
    #[arg(long, short = 'r', allow_negative_numbers = true)]
    radius: Option<i64>,
    /// Sensitivity, usually within 0.2..=0.5 [default: 0.2]
    #[arg(long, short = 'k', allow_negative_numbers = true)]
    k: Option<f64>,
    /// JSON file with `radius` and/or `k`; explicit flags take precedence.
    #[arg(long)]
    params: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct BinarizeArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    /// Output path; `.png` is appended when missing.
    #[arg(long, required = true)]
    out: PathBuf,
    #[command(flatten)]
    params: ParamArgs,
}

#[derive(Args, Debug, Clone)]
struct InspectArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value = "out/inspect")]
    out_dir: PathBuf,
    #[command(flatten)]
    params: ParamArgs,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParamsFile {
    #[serde(default)]
    radius: Option<i64>,
    #[serde(default)]
    k: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
struct RangeDto {
    min: f64,
    max: f64,
}

#[derive(Debug, Clone, Serialize)]
struct MetaInspect {
    input: String,
    width: usize,
    height: usize,
    radius: usize,
    k: f64,
    dynamic_range: f64,
    foreground_fraction: f64,
    mean: Option<RangeDto>,
    std_dev: Option<RangeDto>,
    threshold: Option<RangeDto>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Binarize(args) => run_binarize(args),
        Command::Inspect(args) => run_inspect(args),
    }
}

fn run_binarize(args: BinarizeArgs) -> Result<()> {
    let params = resolve_params(&args.params)?;
    let (gray, maps) = threshold_file(&args.input, &params)?;

    let out = with_png_extension(&args.out);
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    save_u8_image(&out, &to_u8_saturating(&maps.binary.as_view()))?;

    tracing::info!(
        "saved image {} ({}x{}, {:.1}% foreground)",
        out.display(),
        gray.width(),
        gray.height(),
        100.0 * foreground_fraction(&maps.binary)
    );
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let params = resolve_params(&args.params)?;
    let (gray, maps) = threshold_file(&args.input, &params)?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;

    save_u8_image(&args.out_dir.join("input.png"), &gray)?;
    save_u8_image(
        &args.out_dir.join("mean.png"),
        &normalize_to_u8(&maps.mean.as_view()),
    )?;
    save_u8_image(
        &args.out_dir.join("std_dev.png"),
        &normalize_to_u8(&maps.std_dev.as_view()),
    )?;
    save_u8_image(
        &args.out_dir.join("threshold.png"),
        &normalize_to_u8(&maps.threshold.as_view()),
    )?;
    save_u8_image(
        &args.out_dir.join("binary.png"),
        &to_u8_saturating(&maps.binary.as_view()),
    )?;

    write_json(
        &args.out_dir.join("meta.json"),
        &MetaInspect {
            input: args.input.display().to_string(),
            width: gray.width(),
            height: gray.height(),
            radius: params.radius,
            k: params.k,
            dynamic_range: localthresh::SAUVOLA_DYNAMIC_RANGE,
            foreground_fraction: foreground_fraction(&maps.binary),
            mean: range_dto(&maps.mean),
            std_dev: range_dto(&maps.std_dev),
            threshold: range_dto(&maps.threshold),
        },
    )?;

    tracing::info!("wrote inspection grids to {}", args.out_dir.display());
    Ok(())
}

fn threshold_file(path: &Path, params: &SauvolaParams) -> Result<(Image<u8>, SauvolaMaps)> {
    let gray = load_input_u8(path)?;
    tracing::info!(
        "opened image {} ({}x{})",
        path.display(),
        gray.width(),
        gray.height()
    );

    let grid = to_f64(&gray.as_view());
    let maps = SauvolaBinarizer::new(*params)
        .context("validating threshold parameters")?
        .run_with_maps(&grid.as_view())
        .with_context(|| format!("thresholding {}", path.display()))?;

    Ok((gray, maps))
}

fn resolve_params(args: &ParamArgs) -> Result<SauvolaParams> {
    let file = match &args.params {
        Some(path) => read_json::<ParamsFile>(path)?,
        None => ParamsFile::default(),
    };
    let defaults = SauvolaParams::default();

    let radius = args
        .radius
        .or(file.radius)
        .unwrap_or(defaults.radius as i64);
    let k = args.k.or(file.k).unwrap_or(defaults.k);

    let params = SauvolaParams::new(radius, k)
        .with_context(|| format!("invalid parameters radius={radius}, k={k}"))?;
    if !params.k_in_advisory_range() {
        tracing::warn!(
            "k={} is outside the usual range {:?}; continuing",
            params.k,
            SauvolaParams::ADVISORY_K_RANGE
        );
    }
    Ok(params)
}

fn load_input_u8(path: &Path) -> Result<Image<u8>> {
    ensure_file_exists(path, "input")?;
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let luma = dyn_img.to_luma8();
    let (w, h) = luma.dimensions();
    if w == 0 || h == 0 {
        bail!("input image {} has no pixels ({w}x{h})", path.display());
    }
    let data = luma.into_raw();

    Image::from_vec(w as usize, h as usize, data)
        .with_context(|| format!("constructing grid from {}", path.display()))
}

fn save_u8_image(path: &Path, img: &Image<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(img.width() as u32, img.height() as u32, img.data().to_vec())
        .context("constructing GrayImage from raw bytes")?;
    gray.save(path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn with_png_extension(path: &Path) -> PathBuf {
    let is_png = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_owned();
    name.push(".png");
    PathBuf::from(name)
}

fn foreground_fraction(binary: &Image<f64>) -> f64 {
    let total = binary.data().len();
    if total == 0 {
        return 0.0;
    }
    let fg = binary.data().iter().filter(|&&v| v == FOREGROUND).count();
    fg as f64 / total as f64
}

fn range_dto(img: &Image<f64>) -> Option<RangeDto> {
    min_max(&img.as_view()).map(|(min, max)| RangeDto { min, max })
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    ensure_file_exists(path, "params")?;
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use image::GrayImage;
    use localthresh::Image;
    use tempfile::tempdir;

    use super::{
        BinarizeArgs, InspectArgs, ParamArgs, ParamsFile, foreground_fraction, resolve_params,
        run_binarize, run_inspect, with_png_extension,
    };

    /// Light page with dark vertical strokes every eighth column.
    fn write_page(path: &Path, width: u32, height: u32) {
        let page = GrayImage::from_fn(width, height, |x, y| {
            let stroke = x % 8 == 3;
            image::Luma([if stroke { 40 } else { 200 + ((x + y) % 20) as u8 }])
        });
        page.save(path).expect("write input image");
    }

    fn default_params() -> ParamArgs {
        ParamArgs {
            radius: Some(3),
            k: None,
            params: None,
        }
    }

    #[test]
    fn png_extension_is_appended_once() {
        assert_eq!(
            with_png_extension(Path::new("out/page")),
            PathBuf::from("out/page.png")
        );
        assert_eq!(
            with_png_extension(Path::new("out/page.PNG")),
            PathBuf::from("out/page.PNG")
        );
        assert_eq!(
            with_png_extension(Path::new("scan.jpg")),
            PathBuf::from("scan.jpg.png")
        );
    }

    #[test]
    fn missing_flags_use_defaults() {
        let args = ParamArgs {
            radius: None,
            k: None,
            params: None,
        };
        let params = resolve_params(&args).expect("defaults are valid");
        assert_eq!(params.radius, 5);
        assert_eq!(params.k, 0.2);
    }

    #[test]
    fn negative_radius_is_reported() {
        let args = ParamArgs {
            radius: Some(-2),
            k: None,
            params: None,
        };
        let err = resolve_params(&args).expect_err("negative radius");
        assert!(format!("{err:#}").contains("radius must be non-negative"));
    }

    #[test]
    fn params_file_parses_partial_fields() {
        let file: ParamsFile = serde_json::from_str(r#"{ "k": 0.4 }"#).expect("valid json");
        assert_eq!(
            file,
            ParamsFile {
                radius: None,
                k: Some(0.4)
            }
        );
        assert!(serde_json::from_str::<ParamsFile>(r#"{ "kk": 1 }"#).is_err());
    }

    #[test]
    fn foreground_fraction_counts_white() {
        let img = Image::from_vec(4, 1, vec![0.0, 255.0, 255.0, 0.0]).expect("valid image");
        assert_eq!(foreground_fraction(&img), 0.5);
    }

    #[test]
    fn binarize_writes_png_next_to_extensionless_out() {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("page.png");
        write_page(&input, 24, 16);
        let out = dir.path().join("nested").join("result");

        run_binarize(BinarizeArgs {
            input,
            out: out.clone(),
            params: default_params(),
        })
        .expect("binarize run");

        let written = dir.path().join("nested").join("result.png");
        assert!(written.is_file());
        assert!(!out.exists());
        let decoded = image::open(&written).expect("decode output").to_luma8();
        assert_eq!(decoded.dimensions(), (24, 16));
        assert!(decoded.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert!(decoded.pixels().any(|p| p.0[0] == 0));
        assert!(decoded.pixels().any(|p| p.0[0] == 255));
    }

    #[test]
    fn binarize_reports_missing_input() {
        let dir = tempdir().expect("temp dir");
        let err = run_binarize(BinarizeArgs {
            input: dir.path().join("absent.png"),
            out: dir.path().join("out"),
            params: default_params(),
        })
        .expect_err("missing input");
        assert!(format!("{err:#}").contains("does not exist"));
    }

    #[test]
    fn inspect_dumps_grids_and_meta() {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("page.png");
        write_page(&input, 20, 12);
        let params_path = dir.path().join("params.json");
        fs::write(&params_path, r#"{ "radius": 7, "k": 0.4 }"#).expect("write params");
        let out_dir = dir.path().join("inspect");

        run_inspect(InspectArgs {
            input,
            out_dir: out_dir.clone(),
            params: ParamArgs {
                radius: Some(2),
                k: None,
                params: Some(params_path),
            },
        })
        .expect("inspect run");

        for name in ["input", "mean", "std_dev", "threshold", "binary"] {
            let png = out_dir.join(format!("{name}.png"));
            let decoded = image::open(&png).expect("decode grid").to_luma8();
            assert_eq!(decoded.dimensions(), (20, 12), "{name}");
        }

        let meta: serde_json::Value =
            serde_json::from_slice(&fs::read(out_dir.join("meta.json")).expect("read meta"))
                .expect("parse meta");
        assert_eq!(meta["width"], 20);
        assert_eq!(meta["height"], 12);
        // Flag wins over the file, file fills in the rest.
        assert_eq!(meta["radius"], 2);
        assert_eq!(meta["k"], 0.4);
        assert_eq!(meta["dynamic_range"], 128.0);
        let fraction = meta["foreground_fraction"].as_f64().expect("number");
        assert!((0.0..=1.0).contains(&fraction));
        let mean = &meta["mean"];
        assert!(mean["min"].as_f64().expect("min") <= mean["max"].as_f64().expect("max"));
    }
}
