use falling_leaf_2d::prelude::*;
use falling_leaf_2d::rendering::renderer_2d::quad_index_pattern;

fn renderer_with(config: Renderer2DConfig) -> (Renderer2D<HeadlessBackend>, HeadlessBackend) {
    let recorder = HeadlessBackend::new();
    let renderer = Renderer2D::new(recorder.clone(), config).unwrap();
    recorder.clear_calls();
    (renderer, recorder)
}

fn default_renderer() -> (Renderer2D<HeadlessBackend>, HeadlessBackend) {
    renderer_with(Renderer2DConfig::default())
}

fn begin(renderer: &mut Renderer2D<HeadlessBackend>) {
    renderer.begin_scene(&Camera::from_size(10.0), &Mat4::identity());
}

fn unit_quad(renderer: &mut Renderer2D<HeadlessBackend>, x: f32) {
    renderer.draw_quad(&vec3(x, 0.0, 0.0), &vec2(1.0, 1.0), &colors::WHITE);
}

fn textured_quad(renderer: &mut Renderer2D<HeadlessBackend>, texture: &Texture2D) {
    renderer.draw_textured_quad(
        &vec3(0.0, 0.0, 0.0),
        &vec2(1.0, 1.0),
        texture,
        1.0,
        &colors::WHITE,
    );
}

fn white_pixel(renderer: &mut Renderer2D<HeadlessBackend>) -> Texture2D {
    renderer.create_texture(1, 1, &[255, 255, 255, 255]).unwrap()
}

/// the id of the vertex buffer with the given stride
fn vertex_buffer(recorder: &HeadlessBackend, stride: usize) -> u32 {
    recorder.vertex_buffer_with_stride(stride).unwrap()
}

#[test]
fn vertex_and_index_conservation() {
    let (mut renderer, recorder) = default_renderer();
    begin(&mut renderer);
    for i in 0..37 {
        unit_quad(&mut renderer, i as f32);
    }
    assert_eq!(renderer.quad_vertex_count(), 4 * 37);
    assert_eq!(renderer.quad_index_count(), 6 * 37);
    assert_eq!(recorder.count_draw_calls(), 0);

    renderer.end_scene();
    assert_eq!(recorder.draw_indexed_counts(), vec![6 * 37]);
    assert_eq!(
        recorder.vertex_upload_sizes(),
        vec![4 * 37 * std::mem::size_of::<QuadVertex>()]
    );
    assert_eq!(renderer.stats().draw_calls, 1);
    assert_eq!(renderer.stats().quad_count, 37);
}

#[test]
fn overflow_triggers_exactly_one_extra_flush() {
    let (mut renderer, recorder) = renderer_with(Renderer2DConfig::default().with_max_quads(50));
    begin(&mut renderer);
    for i in 0..51 {
        unit_quad(&mut renderer, i as f32);
    }
    renderer.end_scene();

    assert_eq!(recorder.draw_indexed_counts(), vec![50 * 6, 6]);
    assert_eq!(renderer.stats().draw_calls, 2);
    assert_eq!(renderer.stats().quad_count, 51);
}

#[test]
fn default_capacity_overflow() {
    let (mut renderer, recorder) = default_renderer();
    begin(&mut renderer);
    for _ in 0..MAX_QUADS + 1 {
        unit_quad(&mut renderer, 0.0);
    }
    renderer.end_scene();
    assert_eq!(recorder.draw_indexed_counts(), vec![MAX_QUADS as u32 * 6, 6]);
}

#[test]
fn texture_slot_reuse() {
    let (mut renderer, recorder) = default_renderer();
    let texture = white_pixel(&mut renderer);
    begin(&mut renderer);
    assert_eq!(renderer.texture_slot_index(), 1);
    for _ in 0..10 {
        textured_quad(&mut renderer, &texture);
    }
    assert_eq!(renderer.texture_slot_index(), 2);
    assert!(renderer.quad_vertices().iter().all(|v| v.tex_index == 1.0));

    renderer.end_scene();
    assert_eq!(
        recorder.texture_bindings(),
        vec![(0, renderer.white_texture().id()), (1, texture.id())]
    );
}

#[test]
fn texture_slot_overflow_adds_one_draw_call() {
    let (mut renderer, _recorder) = default_renderer();
    let textures: Vec<Texture2D> = (0..MAX_TEXTURE_SLOTS)
        .map(|_| white_pixel(&mut renderer))
        .collect();

    // slot 0 is taken by the white texture, so 15 distinct textures fit
    begin(&mut renderer);
    for texture in &textures[..MAX_TEXTURE_SLOTS - 1] {
        textured_quad(&mut renderer, texture);
    }
    renderer.end_scene();
    let fitting = renderer.stats().draw_calls;
    assert_eq!(fitting, 1);

    renderer.reset_stats();
    begin(&mut renderer);
    for texture in &textures {
        textured_quad(&mut renderer, texture);
    }
    // the last texture went into a fresh batch
    assert_eq!(renderer.stats().draw_calls, 1);
    assert_eq!(renderer.quad_vertex_count(), 4);
    assert_eq!(renderer.texture_slot_index(), 2);
    renderer.end_scene();
    assert_eq!(renderer.stats().draw_calls, fitting + 1);
}

#[test]
fn static_index_pattern() {
    let max_quads = 1000;
    let (renderer, recorder) = renderer_with(Renderer2DConfig::default().with_max_quads(max_quads));
    let buffers = recorder.index_buffers();
    assert_eq!(buffers.len(), 1);
    let indices = recorder.index_data(buffers[0]).unwrap();
    assert_eq!(indices.len(), renderer.config().max_indices());
    for q in 0..max_quads as u32 {
        let base = 4 * q;
        let i = 6 * q as usize;
        assert_eq!(
            indices[i..i + 6],
            [base, base + 1, base + 2, base + 2, base + 3, base]
        );
    }
    assert_eq!(indices, quad_index_pattern(max_quads));
}

#[test]
fn empty_scene_is_idempotent() {
    let (mut renderer, recorder) = default_renderer();
    let before = renderer.stats();
    begin(&mut renderer);
    renderer.end_scene();
    begin(&mut renderer);
    renderer.end_scene();

    assert_eq!(recorder.count_draw_calls(), 0);
    assert!(recorder.vertex_upload_sizes().is_empty());
    assert_eq!(renderer.stats(), before);
}

#[test]
fn untextured_quads_use_slot_zero() {
    let (mut renderer, _recorder) = renderer_with(
        Renderer2DConfig::default()
            .with_max_quads(2)
            .with_max_texture_slots(2),
    );
    let a = white_pixel(&mut renderer);
    let b = white_pixel(&mut renderer);
    begin(&mut renderer);
    textured_quad(&mut renderer, &a);
    unit_quad(&mut renderer, 0.0);
    assert_eq!(renderer.quad_vertices()[0].tex_index, 1.0);
    assert!(renderer.quad_vertices()[4..].iter().all(|v| v.tex_index == 0.0));

    // the full batch is flushed first, slot 0 stays the white texture
    textured_quad(&mut renderer, &b);
    unit_quad(&mut renderer, 0.0);
    assert_eq!(renderer.quad_vertices()[4..].iter().map(|v| v.tex_index).sum::<f32>(), 0.0);
    renderer.end_scene();
}

#[test]
fn quad_vertices_are_transformed() {
    let (mut renderer, recorder) = default_renderer();
    let red = vec4(1.0, 0.0, 0.0, 1.0);
    begin(&mut renderer);
    renderer.draw_quad(&vec3(1.0, 2.0, 0.5), &vec2(2.0, 4.0), &red);
    renderer.end_scene();

    let bytes = recorder.vertex_data(vertex_buffer(&recorder, 48)).unwrap();
    let vertices: Vec<QuadVertex> = bytemuck::pod_collect_to_vec(&bytes);
    let positions: Vec<[f32; 3]> = vertices.iter().map(|v| v.position).collect();
    assert_eq!(
        positions,
        vec![
            [0.0, 0.0, 0.5],
            [2.0, 0.0, 0.5],
            [2.0, 4.0, 0.5],
            [0.0, 4.0, 0.5]
        ]
    );
    for (vertex, uv) in vertices.iter().zip(QUAD_UVS.iter()) {
        assert_eq!(vertex.color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(vertex.uv_coords, [uv.x, uv.y]);
        assert_eq!(vertex.tex_index, 0.0);
        assert_eq!(vertex.tiling, 1.0);
        assert_eq!(vertex.entity_id, NO_ENTITY);
    }
}

#[test]
fn transform_overloads_carry_entity_ids() {
    let (mut renderer, _recorder) = default_renderer();
    let texture = white_pixel(&mut renderer);
    let transform = glm::translation(&vec3(3.0, 0.0, 0.0));
    begin(&mut renderer);
    renderer.draw_quad_transform(&transform, &colors::BLUE, 7);
    renderer.draw_textured_quad_transform(&transform, &texture, 2.5, &colors::WHITE, 8);

    let vertices = renderer.quad_vertices();
    assert!(vertices[..4].iter().all(|v| v.entity_id == 7));
    assert!(vertices[4..].iter().all(|v| v.entity_id == 8 && v.tiling == 2.5));
    assert_eq!(vertices[0].position, [2.5, -0.5, 0.0]);
    renderer.end_scene();
}

#[test]
fn rotated_quad_corners() {
    let (mut renderer, _recorder) = default_renderer();
    begin(&mut renderer);
    renderer.draw_rotated_quad(
        &vec3(0.0, 0.0, 0.0),
        &vec2(2.0, 2.0),
        std::f32::consts::FRAC_PI_2,
        &colors::GREEN,
    );
    // (-1, -1) rotated by 90 degrees ends up at (1, -1)
    let first = renderer.quad_vertices()[0].position;
    assert!((first[0] - 1.0).abs() < 1e-5 && (first[1] + 1.0).abs() < 1e-5);
    renderer.end_scene();
}

#[test]
fn sub_textures_use_atlas_coordinates() {
    let (mut renderer, _recorder) = default_renderer();
    let atlas = renderer.create_texture(4, 2, &[0; 4 * 2 * 4]).unwrap();
    let cell = SubTexture2D::from_coords(atlas, vec2(1.0, 0.0), vec2(2.0, 2.0), vec2(1.0, 1.0));
    begin(&mut renderer);
    renderer.draw_sub_textured_quad(
        &vec3(0.0, 0.0, 0.0),
        &vec2(1.0, 1.0),
        &cell,
        1.0,
        &colors::WHITE,
    );
    let uvs: Vec<[f32; 2]> = renderer.quad_vertices().iter().map(|v| v.uv_coords).collect();
    assert_eq!(uvs, vec![[0.5, 0.0], [1.0, 0.0], [1.0, 1.0], [0.5, 1.0]]);
    assert_eq!(renderer.quad_vertices()[0].tex_index, 1.0);
    renderer.end_scene();
}

#[test]
fn lines_and_quads_flush_independently() {
    let (mut renderer, recorder) = default_renderer();
    begin(&mut renderer);
    unit_quad(&mut renderer, 0.0);
    for i in 0..3 {
        let y = i as f32;
        renderer.draw_line(&vec3(0.0, y, 0.0), &vec3(1.0, y, 0.0), &colors::RED, NO_ENTITY);
    }
    assert_eq!(renderer.line_vertex_count(), 6);
    renderer.end_scene();

    assert_eq!(recorder.draw_indexed_counts(), vec![6]);
    assert_eq!(recorder.draw_lines_counts(), vec![6]);
    assert_eq!(renderer.stats().draw_calls, 2);
    assert_eq!(renderer.stats().line_count, 3);
    assert_eq!(renderer.stats().total_vertex_count(), 4 + 6);
}

#[test]
fn line_overflow_flushes_before_the_next_line() {
    // one quad of capacity leaves room for 4 line vertices
    let (mut renderer, recorder) = renderer_with(Renderer2DConfig::default().with_max_quads(1));
    begin(&mut renderer);
    for _ in 0..3 {
        renderer.draw_line(&vec3(0.0, 0.0, 0.0), &vec3(1.0, 1.0, 0.0), &colors::WHITE, NO_ENTITY);
    }
    renderer.end_scene();
    assert_eq!(recorder.draw_lines_counts(), vec![4, 2]);
}

#[test]
fn rect_outline_is_four_lines() {
    let (mut renderer, _recorder) = default_renderer();
    begin(&mut renderer);
    renderer.draw_rect(&vec3(0.0, 0.0, 0.0), &vec2(2.0, 4.0), &colors::WHITE, 3);
    assert_eq!(renderer.line_vertex_count(), 8);
    assert_eq!(renderer.stats().line_count, 4);

    let points: Vec<[f32; 3]> = renderer.line_vertices().iter().map(|v| v.position).collect();
    assert_eq!(points[0], [-1.0, -2.0, 0.0]);
    assert_eq!(points[1], [1.0, -2.0, 0.0]);
    assert_eq!(points[5], [-1.0, 2.0, 0.0]);
    assert_eq!(points[7], [-1.0, -2.0, 0.0]);
    assert!(renderer.line_vertices().iter().all(|v| v.entity_id == 3));

    renderer.draw_rect_transform(&glm::translation(&vec3(5.0, 0.0, 0.0)), &colors::RED, NO_ENTITY);
    assert_eq!(renderer.line_vertex_count(), 16);
    assert_eq!(renderer.line_vertices()[8].position, [4.5, -0.5, 0.0]);
    renderer.end_scene();
}

#[test]
fn line_width_is_applied_on_flush() {
    let (mut renderer, recorder) = default_renderer();
    assert_eq!(renderer.line_width(), DEFAULT_LINE_WIDTH);
    renderer.set_line_width(5.0);
    begin(&mut renderer);
    renderer.draw_line(&vec3(0.0, 0.0, 0.0), &vec3(1.0, 0.0, 0.0), &colors::WHITE, NO_ENTITY);
    renderer.end_scene();
    assert!(recorder.calls().contains(&RenderCall::SetLineWidth { width: 5.0 }));
}

#[test]
fn begin_scene_uploads_view_projection() {
    let (mut renderer, recorder) = default_renderer();
    let camera = Camera::from_size(2.0);
    let transform = glm::translation(&vec3(1.0, 0.0, 0.0));
    renderer.begin_scene(&camera, &transform);
    renderer.end_scene();

    let expected = camera.projection * glm::translation(&vec3(-1.0, 0.0, 0.0));
    let uploads: Vec<Mat4> = recorder
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            RenderCall::SetMat4 { value, .. } => Some(value),
            _ => None,
        })
        .collect();
    assert_eq!(uploads.len(), 2);
    for value in uploads {
        assert!((value - expected).abs().max() < 1e-6);
    }
}

#[test]
fn ortho_camera_scene() {
    let (mut renderer, recorder) = default_renderer();
    let mut camera = OrthoCamera::new(-1.0, 1.0, -1.0, 1.0);
    camera.set_position(vec3(0.5, 0.0, 0.0));
    renderer.begin_scene_ortho(&camera);
    unit_quad(&mut renderer, 0.0);
    renderer.end_scene();
    assert!(recorder.calls().contains(&RenderCall::SetMat4 {
        shader: 1,
        name: String::from("view_projection"),
        value: *camera.view_projection(),
    }));
}

#[test]
fn drop_releases_all_resources() {
    let recorder = HeadlessBackend::new();
    let renderer = Renderer2D::new(recorder.clone(), Renderer2DConfig::default()).unwrap();
    // 2 shaders, 2 vertex arrays, 3 buffers and the white texture
    assert_eq!(recorder.live_object_count(), 8);
    let white = renderer.white_texture().id();
    drop(renderer);
    assert_eq!(recorder.live_object_count(), 0);
    assert!(!recorder.is_texture_alive(white));
}

#[test]
fn caller_textures_outlive_the_renderer() {
    let recorder = HeadlessBackend::new();
    let mut renderer = Renderer2D::new(recorder.clone(), Renderer2DConfig::default()).unwrap();
    let texture = white_pixel(&mut renderer);
    drop(renderer);
    assert!(recorder.is_texture_alive(texture.id()));
    assert_eq!(recorder.live_object_count(), 1);
}

#[test]
fn clear_reports_backend_errors() {
    let (mut renderer, recorder) = default_renderer();
    assert!(renderer.clear().is_ok());
    recorder.inject_error(0x505);
    match renderer.clear() {
        Err(RenderError::Backend { code, during }) => {
            assert_eq!(code, 0x505);
            assert_eq!(during, "clear");
        }
        other => panic!("expected a backend error, got {other:?}"),
    }
    assert!(renderer.clear().is_ok());
}

#[test]
fn shader_failure_aborts_construction() {
    let recorder = HeadlessBackend::new();
    recorder.fail_shader("renderer2d_line");
    let result = Renderer2D::new(recorder.clone(), Renderer2DConfig::default());
    assert!(matches!(result, Err(RenderError::ShaderCompile { .. })));
    assert_eq!(recorder.live_object_count(), 0);
}

#[test]
fn invalid_config_is_rejected() {
    let recorder = HeadlessBackend::new();
    let result = Renderer2D::new(recorder.clone(), Renderer2DConfig::default().with_max_quads(0));
    assert!(matches!(result, Err(RenderError::InvalidConfig(_))));
    let result = Renderer2D::new(
        recorder.clone(),
        Renderer2DConfig::default().with_max_texture_slots(33),
    );
    assert!(matches!(result, Err(RenderError::InvalidConfig(_))));
    let result = Renderer2D::new(
        recorder.clone(),
        Renderer2DConfig::default().with_max_quads(usize::MAX / 2),
    );
    assert!(matches!(result, Err(RenderError::InvalidConfig(_))));
    assert!(recorder.calls().is_empty());
}

#[test]
fn samplers_cover_every_slot() {
    let recorder = HeadlessBackend::new();
    let _renderer = Renderer2D::new(
        recorder.clone(),
        Renderer2DConfig::default().with_max_texture_slots(8),
    )
    .unwrap();
    assert!(recorder.calls().contains(&RenderCall::SetIntArray {
        shader: 1,
        name: String::from("tex_sampler"),
        values: (0..8).collect(),
    }));
}

#[test]
fn statistics_reset() {
    let (mut renderer, _recorder) = default_renderer();
    begin(&mut renderer);
    unit_quad(&mut renderer, 0.0);
    renderer.end_scene();
    assert_eq!(renderer.stats().total_index_count(), 6);
    renderer.reset_stats();
    assert_eq!(renderer.stats(), Statistics::default());
}

#[test]
fn custom_program_uniforms_reach_the_backend() {
    let (mut renderer, recorder) = default_renderer();
    let backend = renderer.backend_mut();
    let shader = backend.create_shader("glow", "", "").unwrap();
    backend.bind_shader(shader);
    backend.set_float(shader, "intensity", 0.5);
    backend.set_float4(shader, "tint", &colors::RED);

    let calls = recorder.calls();
    assert!(calls.contains(&RenderCall::SetFloat {
        shader,
        name: String::from("intensity"),
        value: 0.5,
    }));
    assert!(calls.contains(&RenderCall::SetFloat4 {
        shader,
        name: String::from("tint"),
        value: colors::RED,
    }));
}

#[test]
fn long_runs_without_recording_keep_no_call_log() {
    let (mut renderer, recorder) = default_renderer();
    recorder.set_recording(false);
    for frame in 0..1000 {
        begin(&mut renderer);
        unit_quad(&mut renderer, frame as f32);
        renderer.end_scene();
    }
    assert!(recorder.calls().is_empty());
    assert_eq!(renderer.stats().draw_calls, 1000);

    // uploads are still stored, the last frame drew the quad at x = 999
    let bytes = recorder.vertex_data(vertex_buffer(&recorder, 48)).unwrap();
    let vertices: Vec<QuadVertex> = bytemuck::pod_collect_to_vec(&bytes);
    assert_eq!(vertices.len(), 4);
    assert_eq!(vertices[0].position[0], 998.5);
}
