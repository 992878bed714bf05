//! Integration tests for the public simulation/render contract.
//!
//! Everything here goes through the crate's public API and runs without a GPU
//! device: shader sources are validated with naga, and the CPU-side contracts
//! (seeding, control uniforms, resize decisions) are checked end to end.

use glam::Vec3;
use polyshred::renderer::PARTICLE_SHADER;
use polyshred::transition::TRANSITION_SHADER;
use polyshred::{
    spherical_shell, ControlUniforms, GridSize, ParticleState, ResizeManager, BOX_NORMALS,
    BOX_VERTICES, MAX_LIFE, PALETTE, VERTICES_PER_PARTICLE,
};

fn validate_wgsl(code: &str) -> Result<(), String> {
    let module =
        naga::front::wgsl::parse_str(code).map_err(|e| format!("WGSL parse error: {:?}", e))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("WGSL validation error: {:?}", e))?;

    Ok(())
}

#[test]
fn test_both_shaders_validate() {
    validate_wgsl(TRANSITION_SHADER).expect("transition shader should be valid WGSL");
    validate_wgsl(PARTICLE_SHADER).expect("particle shader should be valid WGSL");
}

#[test]
fn test_shader_uniform_structs_match_host_names() {
    // The host-side pod structs are written against these struct names;
    // renaming one side must fail loudly here.
    assert!(TRANSITION_SHADER.contains("struct SimUniforms"));
    assert!(PARTICLE_SHADER.contains("struct RenderUniforms"));
    assert!(PARTICLE_SHADER.contains("struct GeometryTables"));
}

#[test]
fn test_initial_distribution_on_shell() {
    // 16 particles, fixed seed: all positions inside the configured shell,
    // all life values inside [0, MAX_LIFE).
    let mut seed_fn = spherical_shell(1234);
    let particles: Vec<ParticleState> = (0..16u32).map(&mut seed_fn).collect();

    for p in &particles {
        let r = p.position.length();
        assert!((0.85..=1.0 + 1e-5).contains(&r), "radius {} off shell", r);
        assert!((0.0..MAX_LIFE).contains(&p.life));
    }
}

#[test]
fn test_seed_reproducibility_across_runs() {
    let a: Vec<ParticleState> = (0..64u32).map(&mut spherical_shell(99)).collect();
    let b: Vec<ParticleState> = (0..64u32).map(&mut spherical_shell(99)).collect();
    assert_eq!(a, b);
}

#[test]
fn test_control_uniform_defaults() {
    let controls = ControlUniforms::default();
    assert!(controls.running);
    assert_eq!(controls.offset, Vec3::ZERO);
    assert_eq!(controls.radius, 2.0);
}

#[test]
fn test_resize_decisions_are_grid_only() {
    let mut manager = ResizeManager::new(1280);
    let initial = manager.grid();
    assert_eq!(initial.particle_count(), 256 * 256);

    // Same device class: no reconstruction.
    assert!(manager.viewport_changed(1600).is_none());

    // Crossing the breakpoint: new grid, new particle count.
    let small = manager.viewport_changed(600).expect("grid should change");
    assert_eq!(
        small,
        GridSize {
            width: 32,
            height: 32
        }
    );
    assert_eq!(manager.grid().particle_count(), 32 * 32);
}

#[test]
fn test_geometry_tables_shape() {
    assert_eq!(BOX_VERTICES.len() as u32, VERTICES_PER_PARTICLE);
    assert_eq!(BOX_NORMALS.len(), 6);
    assert_eq!(PALETTE.len(), 15);
}
