//! Configuration layer merging logic
//!
//! The project file wins over global defaults one field at a time; maps are
//! merged key by key.

use super::schema::PushConfig;

/// Merge the global defaults with the project configuration
///
/// # Arguments
/// * `global` - Defaults from `<config_dir>/push/push.toml`, if present
/// * `project` - The project's `.pushrc`
pub fn merge_configs(global: Option<PushConfig>, project: PushConfig) -> PushConfig {
    let mut merged = global.unwrap_or_default();
    merge_push_config(&mut merged, project);
    merged
}

fn merge_push_config(base: &mut PushConfig, layer: PushConfig) {
    overlay(&mut base.clone_host, layer.clone_host);
    overlay(&mut base.clone_base_dir, layer.clone_base_dir);
    overlay(&mut base.clone_path, layer.clone_path);
    overlay(&mut base.host_user, layer.host_user);
    overlay(&mut base.host_path, layer.host_path);
    overlay(&mut base.skip_tests, layer.skip_tests);
    overlay(&mut base.no_tag, layer.no_tag);
    overlay(&mut base.force_clean_remote, layer.force_clean_remote);
    overlay(&mut base.registry_tool, layer.registry_tool);
    overlay(&mut base.registration_file, layer.registration_file);
    overlay(&mut base.connect_timeout, layer.connect_timeout);

    overlay(&mut base.build.copy, layer.build.copy);
    overlay(&mut base.build.standard_layout, layer.build.standard_layout);
    overlay(&mut base.deploy.purge, layer.deploy.purge);

    // Tool paths are additive
    base.tools.extend(layer.tools);

    // A task's hooks come from one layer only, so a project can drop
    // hooks inherited from the global file by declaring empty lists
    base.hooks.extend(layer.hooks);
}

fn overlay<T>(base: &mut Option<T>, layer: Option<T>) {
    if layer.is_some() {
        *base = layer;
    }
}
