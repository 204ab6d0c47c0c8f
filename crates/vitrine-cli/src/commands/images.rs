//! Image metadata commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tracing::info;
use vitrine_core::{ImageFilters, ImageMeta, SortDir};

use super::{connect, context, parse_pair, print_json, GlobalArgs};

/// Image metadata subcommands.
#[derive(Subcommand)]
pub enum ImagesCommand {
    /// List images
    List(ListArgs),

    /// Show one image
    Show {
        /// Image id
        image_id: String,
    },

    /// Create an image record
    Create(CreateArgs),

    /// Update an image record
    Update(UpdateArgs),

    /// Delete an image record
    Delete {
        /// Image id
        image_id: String,
    },
}

/// Arguments for `images list`.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Return full records instead of summaries
    #[arg(long)]
    pub detailed: bool,

    /// Attribute filter (key=value), repeatable
    #[arg(long = "filter", value_parser = parse_pair)]
    pub filters: Vec<(String, String)>,

    /// Property filter (key=value), repeatable
    #[arg(long = "property", value_parser = parse_pair)]
    pub properties: Vec<(String, String)>,

    /// Maximum number of results
    #[arg(long)]
    pub limit: Option<u32>,

    /// Id of the last image of the previous page
    #[arg(long)]
    pub marker: Option<String>,

    /// Attribute to sort by
    #[arg(long)]
    pub sort_key: Option<String>,

    /// Sort direction (asc or desc)
    #[arg(long)]
    pub sort_dir: Option<String>,
}

/// Arguments for `images create`.
#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    /// Image name
    #[arg(long)]
    pub name: String,

    /// Disk format
    #[arg(long)]
    pub disk_format: Option<String>,

    /// Container format
    #[arg(long)]
    pub container_format: Option<String>,

    /// Make the image visible to every tenant
    #[arg(long)]
    pub public: bool,

    /// Storage location of the image data
    #[arg(long)]
    pub location: Option<String>,

    /// Custom property (key=value), repeatable
    #[arg(long = "property", value_parser = parse_pair)]
    pub properties: Vec<(String, String)>,
}

/// Arguments for `images update`.
#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    /// Image id
    pub image_id: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New storage location
    #[arg(long)]
    pub location: Option<String>,

    /// Custom property (key=value), repeatable
    #[arg(long = "property", value_parser = parse_pair)]
    pub properties: Vec<(String, String)>,

    /// Remove custom properties not listed in this update
    #[arg(long)]
    pub purge_props: bool,
}

/// Runs an images subcommand.
///
/// # Errors
///
/// Returns an error if settings are invalid or the registry call fails.
pub async fn run(global: &GlobalArgs, command: ImagesCommand) -> Result<()> {
    let registry = connect(global)?;
    let ctx = context(global);

    match command {
        ImagesCommand::List(args) => {
            let filters = build_filters(&args)?;
            if args.detailed {
                let images = registry
                    .list_images_detailed(&ctx, &filters)
                    .await
                    .context("Failed to list images")?;
                print_json(&images)
            } else {
                let images = registry
                    .list_images(&ctx, &filters)
                    .await
                    .context("Failed to list images")?;
                print_json(&images)
            }
        }
        ImagesCommand::Show { image_id } => {
            let image = registry
                .get_image_metadata(&ctx, &image_id)
                .await
                .with_context(|| format!("Failed to fetch image {image_id}"))?;
            print_json(&image)
        }
        ImagesCommand::Create(args) => {
            let image = registry
                .add_image_metadata(&ctx, &create_meta(args))
                .await
                .context("Failed to create image")?;
            info!(image_id = image.id.as_deref().unwrap_or_default(), "Created image");
            print_json(&image)
        }
        ImagesCommand::Update(args) => {
            let image = registry
                .update_image_metadata(&ctx, &args.image_id, &update_meta(&args), args.purge_props)
                .await
                .with_context(|| format!("Failed to update image {}", args.image_id))?;
            print_json(&image)
        }
        ImagesCommand::Delete { image_id } => {
            let image = registry
                .delete_image_metadata(&ctx, &image_id)
                .await
                .with_context(|| format!("Failed to delete image {image_id}"))?;
            info!(image_id = %image_id, "Deleted image");
            print_json(&image)
        }
    }
}

/// Builds listing filters from CLI arguments.
fn build_filters(args: &ListArgs) -> Result<ImageFilters> {
    let mut filters = ImageFilters {
        filters: args.filters.iter().cloned().collect(),
        properties: args.properties.iter().cloned().collect(),
        marker: args.marker.clone(),
        limit: args.limit,
        sort_key: args.sort_key.clone(),
        sort_dir: None,
    };

    if let Some(ref dir) = args.sort_dir {
        filters.sort_dir = Some(dir.parse::<SortDir>()?);
    }

    Ok(filters)
}

fn create_meta(args: CreateArgs) -> ImageMeta {
    ImageMeta {
        name: Some(args.name),
        disk_format: args.disk_format,
        container_format: args.container_format,
        is_public: Some(args.public),
        location: args.location,
        properties: args.properties.into_iter().collect(),
        ..ImageMeta::default()
    }
}

fn update_meta(args: &UpdateArgs) -> ImageMeta {
    ImageMeta {
        name: args.name.clone(),
        location: args.location.clone(),
        properties: args.properties.iter().cloned().collect(),
        ..ImageMeta::default()
    }
}
