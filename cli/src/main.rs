use clap::Parser;
use anyhow::Result;
use std::path::Path;
use fbx_oxide::prelude::ConfigType;

#[derive(Parser)]
#[command(name = "fbx-cli")]
#[command(about = "A CLI tool for exporting scenes as ASCII FBX")]
struct Cli {
    /// Input file path
    #[arg(short, long)]
    input: String,

    /// Output file path
    #[arg(short, long)]
    output: String,

    /// Encoder configuration as a JSON file. Flags below override its values.
    #[arg(long)]
    config: Option<String>,

    /// Copy textures as png files next to the output file
    #[arg(long)]
    copy_textures: bool,

    /// Folder the textures are copied to, relative to the output file
    #[arg(long)]
    textures_folder: Option<String>,

    /// Remove the texture folder before copying
    #[arg(long)]
    clear_texture_folder: bool,

    /// Prefix material names with the name of the root node
    #[arg(long)]
    prefix_material_names: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    convert_obj_to_fbx(&cli.input, &cli.output, &config)
}

fn load_config(cli: &Cli) -> Result<fbx_oxide::encode::Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path, e))?;
            serde_json::from_str(&text)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}: {}", path, e))?
        }
        None => fbx_oxide::encode::Config::default(),
    };

    config.copy_textures |= cli.copy_textures;
    config.clear_texture_folder |= cli.clear_texture_folder;
    config.prefix_material_names |= cli.prefix_material_names;
    if let Some(folder) = &cli.textures_folder {
        config.textures_folder = folder.clone();
    }
    Ok(config)
}

fn convert_obj_to_fbx(input_path: &str, output_path: &str, config: &fbx_oxide::encode::Config) -> Result<()> {

    // Check input file extension
    let input_ext = Path::new(input_path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    if !input_ext.eq_ignore_ascii_case("obj") {
        anyhow::bail!("Input file must be a .obj file");
    }

    // Load the OBJ file as a scene
    let scene = fbx_oxide::io::scene_io::read_scene_from_file(input_path)
        .map_err(|e| anyhow::anyhow!("Failed to load OBJ file: {}", e))?;
    log::info!("Loaded {} nodes from {}.", scene.num_nodes(), input_path);

    // Encode and write; the output extension is checked by the encoder
    fbx_oxide::io::scene_io::write_scene_to_file(output_path, &scene, config)
        .map_err(|e| anyhow::anyhow!("Failed to export FBX file: {}", e))?;

    Ok(())
}
