/// DOM pieces around the canvas: event listeners, the settings panel and
/// the stats overlay
use geometrie_core::settings::{FieldKind, FieldSpec, FIELDS};
use geometrie_core::{Color, FrameStats, SettingsChange, SettingsState, StatsPanel};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, HtmlInputElement};

/// An event listener that unregisters itself when dropped
pub struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

fn create<T: JsCast>(document: &Document, tag: &str) -> Result<T, JsValue> {
    document
        .create_element(tag)?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("<{}> has an unexpected type", tag)))
}

/// Read the edit an input currently expresses
pub fn change_from_input(field: &FieldSpec, input: &HtmlInputElement) -> Option<SettingsChange> {
    match (field.key, field.kind) {
        ("color", FieldKind::Color) => Color::parse(&input.value()).ok().map(SettingsChange::Color),
        ("wireframe", FieldKind::Toggle) => Some(SettingsChange::Wireframe(input.checked())),
        ("isVisible", FieldKind::Toggle) => Some(SettingsChange::IsVisible(input.checked())),
        ("opacityWireframe", FieldKind::Range { .. }) => input
            .value()
            .parse::<f32>()
            .ok()
            .map(SettingsChange::OpacityWireframe),
        _ => None,
    }
}

/// The settings form: one labelled input per panel field
pub struct SettingsForm {
    root: HtmlElement,
    inputs: Vec<(FieldSpec, HtmlInputElement)>,
}

impl SettingsForm {
    pub fn new(document: &Document, state: &SettingsState) -> Result<Self, JsValue> {
        let root: HtmlElement = create(document, "div")?;
        root.set_class_name("settings");
        let style = root.style();
        style.set_property("position", "absolute")?;
        style.set_property("top", "0")?;
        style.set_property("right", "0")?;
        style.set_property("padding", "8px")?;
        style.set_property("background", "rgba(0, 0, 0, 0.6)")?;
        style.set_property("color", "#fff")?;
        style.set_property("font", "12px sans-serif")?;

        let mut inputs = Vec::with_capacity(FIELDS.len());
        for field in FIELDS {
            let row: Element = create(document, "label")?;
            row.set_attribute("style", "display: block; margin: 2px 0")?;
            row.set_text_content(Some(field.label));

            let input: HtmlInputElement = create(document, "input")?;
            input.set_name(field.key);
            match field.kind {
                FieldKind::Color => input.set_type("color"),
                FieldKind::Toggle => input.set_type("checkbox"),
                FieldKind::Range { min, max, step } => {
                    input.set_type("range");
                    input.set_min(&min.to_string());
                    input.set_max(&max.to_string());
                    input.set_step(&step.to_string());
                }
            }
            row.append_child(&input)?;
            root.append_child(&row)?;
            inputs.push((field, input));
        }

        let form = Self { root, inputs };
        form.show(state);
        Ok(form)
    }

    pub fn element(&self) -> &HtmlElement {
        &self.root
    }

    pub fn inputs(&self) -> &[(FieldSpec, HtmlInputElement)] {
        &self.inputs
    }

    /// Make every input reflect `state`
    pub fn show(&self, state: &SettingsState) {
        for (field, input) in &self.inputs {
            match field.key {
                "color" => input.set_value(&state.color.to_css()),
                "wireframe" => input.set_checked(state.wireframe_visible),
                "opacityWireframe" => input.set_value(&format!("{:.2}", state.wireframe_opacity)),
                "isVisible" => input.set_checked(state.shapes_visible),
                _ => {}
            }
        }
    }
}

/// FPS and MS readouts in the top-left corner
pub struct StatsOverlay {
    root: HtmlElement,
    panels: [(StatsPanel, Element); 2],
}

impl StatsOverlay {
    pub fn new(document: &Document) -> Result<Self, JsValue> {
        let root: HtmlElement = create(document, "div")?;
        root.set_class_name("stats");
        let style = root.style();
        style.set_property("position", "absolute")?;
        style.set_property("top", "0")?;
        style.set_property("left", "0")?;
        style.set_property("font", "bold 9px monospace")?;
        style.set_property("pointer-events", "none")?;

        let panel = |kind: StatsPanel, color: &str| -> Result<(StatsPanel, Element), JsValue> {
            let element: Element = create(document, "div")?;
            element.set_attribute(
                "style",
                &format!("color: {}; background: #002; padding: 1px 3px", color),
            )?;
            root.append_child(&element)?;
            Ok((kind, element))
        };
        let panels = [panel(StatsPanel::Fps, "#0ff")?, panel(StatsPanel::Ms, "#0f0")?];

        let overlay = Self { root, panels };
        overlay.show(&FrameStats::default());
        Ok(overlay)
    }

    pub fn element(&self) -> &HtmlElement {
        &self.root
    }

    pub fn show(&self, stats: &FrameStats) {
        for (kind, element) in &self.panels {
            element.set_text_content(Some(&stats.panel_text(*kind)));
        }
    }
}
