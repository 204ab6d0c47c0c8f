//! Image membership commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tracing::info;
use vitrine_core::{ImageMember, MemberData};

use super::{connect, context, print_json, GlobalArgs};

/// Membership subcommands.
#[derive(Subcommand)]
pub enum MembersCommand {
    /// List members of an image
    List {
        /// Image id
        image_id: String,
    },

    /// List images shared with a member
    Shared {
        /// Member (tenant) id
        member_id: String,
    },

    /// Add or update one member
    Add(AddArgs),

    /// Remove one member
    Remove {
        /// Image id
        image_id: String,
        /// Member (tenant) id
        member_id: String,
    },

    /// Replace the whole membership list
    Replace(ReplaceArgs),
}

/// Arguments for `members add`.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Image id
    pub image_id: String,

    /// Member (tenant) id
    pub member_id: String,

    /// Allow the member to share the image further
    #[arg(long)]
    pub can_share: Option<bool>,
}

/// Arguments for `members replace`.
#[derive(Args, Debug)]
pub struct ReplaceArgs {
    /// Image id
    pub image_id: String,

    /// New member ids; an empty list removes every member
    pub member_ids: Vec<String>,

    /// Allow every listed member to share the image further
    #[arg(long)]
    pub can_share: bool,
}

/// Runs a members subcommand.
///
/// # Errors
///
/// Returns an error if settings are invalid or the registry call fails.
pub async fn run(global: &GlobalArgs, command: MembersCommand) -> Result<()> {
    let registry = connect(global)?;
    let ctx = context(global);

    match command {
        MembersCommand::List { image_id } => {
            let members = registry
                .get_image_members(&ctx, &image_id)
                .await
                .with_context(|| format!("Failed to list members of image {image_id}"))?;
            print_json(&members)
        }
        MembersCommand::Shared { member_id } => {
            let images = registry
                .get_member_images(&ctx, &member_id)
                .await
                .with_context(|| format!("Failed to list images shared with {member_id}"))?;
            print_json(&images)
        }
        MembersCommand::Add(args) => {
            registry
                .add_member(&ctx, &args.image_id, &args.member_id, args.can_share)
                .await
                .with_context(|| {
                    format!("Failed to add {} to image {}", args.member_id, args.image_id)
                })?;
            info!(image_id = %args.image_id, member_id = %args.member_id, "Added member");
            Ok(())
        }
        MembersCommand::Remove {
            image_id,
            member_id,
        } => {
            registry
                .delete_member(&ctx, &image_id, &member_id)
                .await
                .with_context(|| format!("Failed to remove {member_id} from image {image_id}"))?;
            info!(image_id = %image_id, member_id = %member_id, "Removed member");
            Ok(())
        }
        MembersCommand::Replace(args) => {
            let data = member_data(&args);
            registry
                .replace_members(&ctx, &args.image_id, &data)
                .await
                .with_context(|| format!("Failed to replace members of image {}", args.image_id))?;
            info!(
                image_id = %args.image_id,
                members = data.memberships.len(),
                "Replaced members"
            );
            Ok(())
        }
    }
}

fn member_data(args: &ReplaceArgs) -> MemberData {
    args.member_ids
        .iter()
        .map(|id| ImageMember::new(id.clone(), args.can_share))
        .collect()
}
