//! Scene list builder
//!
//! Scenes are the render-time projection of routes. A route removed from
//! the state stays around as a stale scene until the transition that hides
//! it has finished, and scenes that did not change are reused so views keyed
//! by scene key are not remounted.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{NavigationError, Result};
use crate::state::{NavigationState, Route};

/// Prefix of every scene key
pub const SCENE_KEY_PREFIX: &str = "scene_";

/// Render-time projection of a route
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Stable key derived from the route key
    pub key: String,
    /// Position in the stack
    pub index: usize,
    /// The route
    pub route: Arc<Route>,
    /// Route was removed and is only kept for its exit transition
    pub is_stale: bool,
    /// Scene of the active route
    pub is_active: bool,
}

impl Scene {
    fn new(index: usize, route: &Arc<Route>, is_stale: bool) -> Self {
        Self {
            key: scene_key(&route.key),
            index,
            route: route.clone(),
            is_stale,
            is_active: false,
        }
    }

    /// Same key, position, flags and route contents
    fn shallow_eq(&self, other: &Scene) -> bool {
        self.key == other.key
            && self.index == other.index
            && self.is_stale == other.is_stale
            && self.is_active == other.is_active
            && (Arc::ptr_eq(&self.route, &other.route) || self.route == other.route)
    }
}

/// Scene key for a route key
pub fn scene_key(route_key: &str) -> String {
    format!("{}{}", SCENE_KEY_PREFIX, route_key)
}

fn compare_scenes(one: &Scene, two: &Scene) -> Ordering {
    one.index
        .cmp(&two.index)
        .then_with(|| one.key.cmp(&two.key))
}

/// Build the scene list for `next`
///
/// `previous` is the scene list built for `prev`. Routes present in `prev`
/// (or already stale in `previous`) but missing from `next` are kept as stale
/// scenes at their old index.
pub fn build_scenes(
    previous: &[Scene],
    next: &NavigationState,
    prev: Option<&NavigationState>,
) -> Result<Vec<Scene>> {
    let previous_by_key: HashMap<&str, &Scene> =
        previous.iter().map(|scene| (scene.key.as_str(), scene)).collect();

    let mut fresh: Vec<Scene> = Vec::with_capacity(next.len());
    let mut fresh_keys: HashSet<String> = HashSet::with_capacity(next.len());
    for (index, route) in next.routes().iter().enumerate() {
        let scene = Scene::new(index, route, false);
        if !fresh_keys.insert(scene.key.clone()) {
            return Err(NavigationError::DuplicateRouteKey(route.key.clone()));
        }
        fresh.push(scene);
    }

    let mut stale: Vec<Scene> = Vec::new();
    let mut stale_keys: HashSet<String> = HashSet::new();
    for scene in previous.iter().filter(|scene| scene.is_stale) {
        if !fresh_keys.contains(&scene.key) && stale_keys.insert(scene.key.clone()) {
            stale.push(scene.clone());
        }
    }
    if let Some(prev) = prev {
        for (index, route) in prev.routes().iter().enumerate() {
            let key = scene_key(&route.key);
            if fresh_keys.contains(&key) || stale_keys.contains(&key) {
                continue;
            }
            stale_keys.insert(key);
            stale.push(Scene::new(index, route, true));
        }
    }

    let mut scenes: Vec<Scene> = stale.into_iter().chain(fresh).collect();
    scenes.sort_by(compare_scenes);

    for scene in scenes.iter_mut() {
        scene.is_active = !scene.is_stale && scene.index == next.index();
        if let Some(prev_scene) = previous_by_key.get(scene.key.as_str()) {
            if prev_scene.shallow_eq(scene) {
                *scene = (*prev_scene).clone();
            }
        }
    }
    debug_assert_eq!(scenes.iter().filter(|s| s.is_active).count(), 1);

    Ok(scenes)
}

/// Drop stale scenes once their exit transition has finished
pub fn prune_stale(scenes: &[Scene]) -> Vec<Scene> {
    scenes.iter().filter(|scene| !scene.is_stale).cloned().collect()
}

/// The active scene
pub fn active_scene(scenes: &[Scene]) -> Option<&Scene> {
    scenes.iter().find(|scene| scene.is_active)
}

// =============================================================================
// Tests
// =============================================================================
