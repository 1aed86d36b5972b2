//! 收集范围的调试标记：纯视觉辅助，逻辑永远不读它。

use bevy::prelude::*;

/// 到期自动清理的临时标记
#[derive(Component)]
pub struct DebugMarker {
    pub ttl: Timer,
}

const RING_SEGMENTS: usize = 48;

/// 画出检测圈与命中点。圈由离散的标记实体近似，`duration` 秒后消失。
pub fn spawn_detection_markers(
    commands: &mut Commands,
    center: Vec3,
    radius: f32,
    hits: &[Vec3],
    duration: f32,
) {
    let step = std::f32::consts::TAU / RING_SEGMENTS as f32;
    for i in 0..RING_SEGMENTS {
        let angle = step * i as f32;
        let pos = center + Vec3::new(angle.sin(), 0.0, angle.cos()) * radius;
        commands.spawn((
            DebugMarker {
                ttl: Timer::from_seconds(duration, TimerMode::Once),
            },
            Transform::from_translation(pos),
        ));
    }
    for hit in hits {
        commands.spawn((
            DebugMarker {
                ttl: Timer::from_seconds(duration, TimerMode::Once),
            },
            Transform::from_translation(*hit),
        ));
    }
}

pub fn tick_debug_markers(
    mut commands: Commands,
    time: Res<Time>,
    mut markers: Query<(Entity, &mut DebugMarker)>,
) {
    for (e, mut marker) in markers.iter_mut() {
        if marker.ttl.tick(time.delta()).finished() {
            commands.entity(e).despawn();
        }
    }
}
