use std::time::Duration;

use tokio::time::Instant;

use crate::bus::EventBus;
use crate::config::MonitorConfig;
use crate::monitor::runtime::spawn_monitor;
use crate::monitor::MenuMonitor;
use crate::tree::{Document, HeaderRootLocator, Tree};

use super::{resolve, Scenario, ScenarioError, Step};

/// Apply one step to `monitor` at time `now`.
///
/// `Advance` is a no-op here; the caller owns the clock.
pub fn apply_step<B: EventBus>(
    monitor: &mut MenuMonitor<Document, B>,
    step: &Step,
    now: Instant,
) -> Result<(), ScenarioError> {
    match step {
        Step::SetAttribute { node, name, value } => {
            let node = resolve(monitor.tree(), node)?;
            monitor.tree_mut().set_attribute(node, name, value)?;
        }
        Step::RemoveAttribute { node, name } => {
            let node = resolve(monitor.tree(), node)?;
            monitor.tree_mut().remove_attribute(node, name)?;
        }
        Step::AddClass { node, class } => {
            let node = resolve(monitor.tree(), node)?;
            monitor.tree_mut().add_class(node, class)?;
        }
        Step::RemoveClass { node, class } => {
            let node = resolve(monitor.tree(), node)?;
            monitor
                .tree_mut()
                .remove_classes(node, std::slice::from_ref(class))?;
        }
        Step::SetText { node, text } => {
            let node = resolve(monitor.tree(), node)?;
            monitor.tree_mut().set_text_content(node, text)?;
        }
        Step::SetDisplay { node, display } => {
            let node = resolve(monitor.tree(), node)?;
            monitor.tree_mut().set_display(node, display.as_deref())?;
        }
        Step::Append { parent, spec } => {
            let parent = resolve(monitor.tree(), parent)?;
            let subtree = spec.to_snapshot()?;
            monitor.tree_mut().append_snapshot(parent, &subtree)?;
        }
        Step::Remove { node } => {
            let node = resolve(monitor.tree(), node)?;
            monitor.tree_mut().detach(node)?;
        }
        Step::PointerEnter { node } => {
            let node = resolve(monitor.tree(), node)?;
            monitor.pointer_enter(node, now);
        }
        Step::PointerLeave => monitor.pointer_leave(),
        Step::Advance { .. } => {}
        Step::Signal { topic } => monitor.handle_signal(*topic),
        Step::ForceClose => monitor.force_close(),
    }
    Ok(())
}

fn attach<B: EventBus>(
    scenario: &Scenario,
    mut config: MonitorConfig,
    bus: B,
) -> Result<MenuMonitor<Document, B>, ScenarioError> {
    if let Some(ms) = scenario.hover_ms {
        config = config.with_hover_duration(Duration::from_millis(ms));
    }
    let doc = scenario.build_document(&config.stable_id_attribute)?;
    MenuMonitor::attach(doc, bus, config, &HeaderRootLocator::default())
        .ok_or(ScenarioError::NoRoot)
}

/// Run `scenario` on a virtual clock and return the monitor in its final
/// state. Each step's tree changes are delivered before the next step.
pub fn play<B: EventBus>(
    scenario: &Scenario,
    config: MonitorConfig,
    bus: B,
) -> Result<MenuMonitor<Document, B>, ScenarioError> {
    let mut monitor = attach(scenario, config, bus)?;
    let mut now = Instant::now();

    for (index, step) in scenario.steps.iter().enumerate() {
        tracing::trace!(index, ?step, "Scenario step");
        if let Step::Advance { ms } = step {
            now += Duration::from_millis(*ms);
            monitor.poll_timer(now);
        } else {
            apply_step(&mut monitor, step, now)?;
        }
        monitor.sync();
    }

    Ok(monitor)
}

/// Run `scenario` against a spawned monitor task in real time
pub async fn play_live<B>(
    scenario: &Scenario,
    config: MonitorConfig,
    bus: B,
) -> Result<MenuMonitor<Document, B>, ScenarioError>
where
    B: EventBus + Send + 'static,
{
    let monitor = attach(scenario, config, bus)?;
    let (handle, task) = spawn_monitor(monitor);

    for step in scenario.steps.iter().cloned() {
        if let Step::Advance { ms } = step {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            continue;
        }
        let result = handle
            .with(move |monitor| apply_step(monitor, &step, Instant::now()))
            .await;
        match result {
            Some(result) => result?,
            None => break,
        }
    }

    handle.shutdown();
    Ok(task.await?)
}
