use anyhow::Result;

use pixelpet::models::PetAction;

use super::{print_json, Context};

pub async fn status(ctx: &Context) -> Result<()> {
    let pet = ctx.client.pet_me().await?;
    let points = ctx.client.pet_points().await?;

    if ctx.json {
        return print_json(&serde_json::json!({ "pet": pet, "points": points }));
    }

    let s = &pet.status;
    println!("{} the {} - level {}", pet.name, pet.breed, s.level);
    println!("XP {}/{} ({}%)", s.xp, s.xp_to_next, s.xp_progress_percent());
    println!("Hunger {}  Happiness {}  Energy {}", s.hunger, s.happiness, s.energy);
    println!(
        "Points: feeding {}  playing {}  cleaning {}",
        points.feeding, points.playing, points.cleaning
    );
    Ok(())
}

pub async fn act(ctx: &Context, action: PetAction) -> Result<()> {
    let before = ctx.client.pet_status().await?;
    let result = ctx.client.pet_action(action).await?;
    let after = &result.pet.status;

    if ctx.json {
        return print_json(&result);
    }

    println!("{} done. Level {} ({}% to next)", action, after.level, after.xp_progress_percent());
    if before.leveled_up_to(after) {
        log::info!("Pet leveled up from {} to {}", before.level, after.level);
        println!("Level up! {} reached level {}", result.pet.name, after.level);
    }
    Ok(())
}
