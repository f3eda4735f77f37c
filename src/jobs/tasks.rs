/// Background task implementations
use crate::{
    context::AppContext,
    error::MarkerResult,
    markers::{MarkerDocument, PlayerMarker},
};
use futures::future::join_all;

/// Snapshot all connected players into the marker file
///
/// Profiles are resolved concurrently; an offline-mode server gets its
/// players' real profiles looked up through the profile cache. Returns the
/// number of players written.
pub async fn update_markers(ctx: &AppContext) -> MarkerResult<usize> {
    let state = ctx.player_source.server_state().await?;
    let offline_mode = !state.online_mode;

    let resolver = &ctx.profile_resolver;
    let profiles = join_all(
        state
            .players
            .iter()
            .map(|player| resolver.resolve(&player.profile, offline_mode, true)),
    )
    .await;

    let document = MarkerDocument {
        players: state
            .players
            .iter()
            .zip(profiles)
            .map(|(player, profile)| PlayerMarker::new(player, profile))
            .collect(),
    };
    let count = document.players.len();

    if ctx.config.markers.async_write {
        ctx.snapshot_writer.spawn_write(document);
    } else {
        ctx.snapshot_writer.write_logged(&document).await;
    }

    Ok(count)
}
