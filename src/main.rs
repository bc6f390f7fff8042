//! Skywatch: runs the orbit explorer app.

use bevy::app::AppExit;
use orbit_explorer::prelude::*;

fn main() -> AppExit {
    let _ = dotenvy::dotenv();
    OrbitExplorerBuilder::new().from_env().build().run()
}
