use anyhow::{bail, Result};

use pixelpet::models::{Profile, ProfilePatch};

use super::{print_json, Context};

pub async fn show(ctx: &Context) -> Result<()> {
    let profile = ctx.client.get_profile().await?;
    render(ctx, &profile)
}

pub async fn set(ctx: &Context, patch: ProfilePatch) -> Result<()> {
    if patch.is_empty() {
        bail!("nothing to change; pass --name, --phone or --address");
    }
    let profile = ctx.client.update_profile(&patch).await?;
    log::info!("Updated profile for user {}", profile.id);
    render(ctx, &profile)
}

fn render(ctx: &Context, profile: &Profile) -> Result<()> {
    if ctx.json {
        return print_json(profile);
    }
    println!("{} <{}>", profile.name.as_deref().unwrap_or("(no name)"), profile.email);
    if let Some(phone) = &profile.phone {
        println!("  phone:   {}", phone);
    }
    if let Some(address) = &profile.address {
        println!("  address: {}", address);
    }
    Ok(())
}
