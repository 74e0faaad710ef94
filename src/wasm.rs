//! Browser entry point.
//!
//! Binds [`UploadForm`] to the upload page: a [`DomSurface`] over the
//! page's elements, a `fetch` transport and notifications cloned from the
//! page's `#success` / `#error` templates. DOM events are caught once at
//! the document and re-dispatched through the form's own listener routing.

use std::cell::RefCell;
use std::rc::Rc;

use imgpost_ui::{Event, EventKind, Key};
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlImageElement,
    HtmlInputElement, HtmlTemplateElement, HtmlTextAreaElement, KeyboardEvent, Request,
    RequestInit, Response, Url,
};

use crate::config::FormConfig;
use crate::controller::{Collaborators, UploadForm};
use crate::effects::{format_level, Effect, SliderRange};
use crate::form::{Field, FormData, SelectedFile, SubmitButton};
use crate::node::Node;
use crate::notify::Notifier;
use crate::surface::Surface;
use crate::transport::{SendFuture, Transport, TransportError};

/// Page elements that could not be bound.
#[derive(Error, Debug)]
pub enum MountError {
    #[error("Browser window or document unavailable")]
    NoDocument,

    #[error("Element '{0}' not found")]
    Missing(&'static str),

    #[error("Element '{0}' has an unexpected type")]
    WrongKind(&'static str),

    #[error("DOM call failed: {0}")]
    Js(String),
}

impl From<JsValue> for MountError {
    fn from(value: JsValue) -> Self {
        MountError::Js(describe(&value))
    }
}

fn describe(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn query<T: JsCast>(document: &Document, selector: &'static str) -> Result<T, MountError> {
    document
        .query_selector(selector)?
        .ok_or(MountError::Missing(selector))?
        .dyn_into::<T>()
        .map_err(|_| MountError::WrongKind(selector))
}

type Controller = Rc<RefCell<UploadForm<DomSurface>>>;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    // The logger needs the configured level, so storage problems are
    // reported once it is up
    let (config, stored) = match FormConfig::load_from_local_storage() {
        Ok(Some(config)) => (config, Ok(true)),
        Ok(None) => (FormConfig::default(), Ok(false)),
        Err(e) => (FormConfig::default(), Err(e)),
    };
    if let Err(e) = console_log::init_with_level(config.log_level.into()) {
        web_sys::console::warn_1(&format!("Logger already set: {}", e).into());
    }
    match stored {
        Ok(true) => log::info!("Using configuration from localStorage"),
        Ok(false) => log::debug!("No stored configuration, using defaults"),
        Err(e) => log::warn!("Stored configuration ignored: {}", e),
    }

    if let Err(e) = mount(&config) {
        log::error!("Upload form not mounted: {}", e);
    }
}

fn mount(config: &FormConfig) -> Result<(), MountError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(MountError::NoDocument)?;

    let surface = DomSurface::bind(&document)?;
    let nodes = Rc::new(NodeMap::bind(&document, &surface)?);
    let transport = FetchTransport {
        endpoint: config.endpoint.clone(),
        form: surface.form.clone(),
    };
    let notifier = DomNotifier {
        document: document.clone(),
    };

    let collaborators = Collaborators::new(config, Rc::new(transport), Box::new(notifier));
    let controller: Controller = Rc::new(RefCell::new(UploadForm::new(
        surface,
        config,
        collaborators,
    )));

    for (dom_type, kind) in [
        ("change", EventKind::Change),
        ("input", EventKind::Input),
        ("click", EventKind::Click),
        ("submit", EventKind::Submit),
        ("keydown", EventKind::KeyDown),
    ] {
        let controller = Rc::clone(&controller);
        let nodes = Rc::clone(&nodes);
        let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |dom: web_sys::Event| {
            forward(&controller, &nodes, kind, &dom);
        });
        document.add_event_listener_with_callback(dom_type, listener.as_ref().unchecked_ref())?;
        // Lives as long as the page
        listener.forget();
    }

    log::info!("Upload form mounted, posting to {}", config.endpoint);
    Ok(())
}

/// Translate one DOM event and run it through the form.
fn forward(controller: &Controller, nodes: &NodeMap, kind: EventKind, dom: &web_sys::Event) {
    let Some(target) = dom.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return;
    };
    let node = nodes.resolve(&target);

    let mut event = match kind {
        EventKind::KeyDown => {
            let Some(key) = dom
                .dyn_ref::<KeyboardEvent>()
                .and_then(|k| Key::from_dom(&k.key()))
            else {
                return;
            };
            Event::key_down(node, key)
        }
        _ => Event::new(node, kind),
    };
    if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
        event = event.with_value(input.value());
    }

    let pending = controller.borrow_mut().dispatch(&mut event);
    if event.is_default_prevented() {
        dom.prevent_default();
    }

    if let Some(pending) = pending {
        let controller = Rc::clone(controller);
        wasm_bindgen_futures::spawn_local(async move {
            let settled = pending.outcome().await;
            controller.borrow_mut().settle(settled);
        });
    }
}

/// Maps DOM elements back to routing nodes.
struct NodeMap {
    /// Innermost first; the form is the fallback before the document.
    controls: Vec<(Node, Element)>,
    form: Element,
}

impl NodeMap {
    fn bind(document: &Document, surface: &DomSurface) -> Result<Self, MountError> {
        let controls: Vec<(Node, Element)> = vec![
            (Node::UploadInput, surface.upload.clone().into()),
            (Node::CancelButton, query(document, "#upload-cancel")?),
            (Node::SubmitButton, surface.submit.clone().into()),
            (Node::HashtagInput, surface.hashtags.clone().into()),
            (Node::CommentInput, surface.comment.clone().into()),
            (Node::EffectsList, surface.effects_list.clone()),
            (Node::EffectLevel, surface.slider.clone().into()),
            (Node::ScaleSmaller, query(document, ".scale__control--smaller")?),
            (Node::ScaleBigger, query(document, ".scale__control--bigger")?),
        ];
        Ok(Self {
            controls,
            form: surface.form.clone().into(),
        })
    }

    fn resolve(&self, target: &Element) -> Node {
        let target: &web_sys::Node = target.as_ref();
        for (node, element) in &self.controls {
            if element.contains(Some(target)) {
                return *node;
            }
        }
        if self.form.contains(Some(target)) {
            Node::Form
        } else {
            Node::Document
        }
    }
}

/// [`Surface`] over the upload page's markup.
pub struct DomSurface {
    body: HtmlElement,
    form: HtmlFormElement,
    upload: HtmlInputElement,
    overlay: Element,
    preview: HtmlImageElement,
    thumbnails: Vec<HtmlElement>,
    hashtags: HtmlInputElement,
    comment: HtmlTextAreaElement,
    errors: [Element; 2],
    submit: HtmlButtonElement,
    scale_value: HtmlInputElement,
    level_container: Element,
    slider: HtmlInputElement,
    level_value: HtmlInputElement,
    effects_list: Element,
    object_url: Option<String>,
}

impl DomSurface {
    fn bind(document: &Document) -> Result<Self, MountError> {
        let body = document.body().ok_or(MountError::Missing("body"))?;

        let thumbnail_nodes = document.query_selector_all(".effects__preview")?;
        let thumbnails = (0..thumbnail_nodes.length())
            .filter_map(|i| thumbnail_nodes.get(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect();

        let hashtags: HtmlInputElement = query(document, ".text__hashtags")?;
        let comment: HtmlTextAreaElement = query(document, ".text__description")?;
        let errors = [
            error_slot(document, hashtags.as_ref())?,
            error_slot(document, comment.as_ref())?,
        ];

        // Range input driving the effect level
        let slider_host: Element = query(document, ".effect-level__slider")?;
        let slider: HtmlInputElement = document
            .create_element("input")?
            .dyn_into()
            .map_err(|_| MountError::WrongKind("input"))?;
        slider.set_type("range");
        slider_host.append_child(&slider)?;

        Ok(Self {
            body,
            form: query(document, ".img-upload__form")?,
            upload: query(document, "#upload-file")?,
            overlay: query(document, ".img-upload__overlay")?,
            preview: query(document, ".img-upload__preview img")?,
            thumbnails,
            hashtags,
            comment,
            errors,
            submit: query(document, ".img-upload__submit")?,
            scale_value: query(document, ".scale__control--value")?,
            level_container: query(document, ".img-upload__effect-level")?,
            slider,
            level_value: query(document, ".effect-level__value")?,
            effects_list: query(document, ".effects__list")?,
            object_url: None,
        })
    }

    fn error_element(&self, field: Field) -> &Element {
        match field {
            Field::Hashtags => &self.errors[0],
            Field::Comment => &self.errors[1],
        }
    }

    fn set_preview_style(&self, property: &str, value: Option<&str>) {
        let style = self.preview.style();
        let result = match value {
            Some(value) => style.set_property(property, value),
            None => style.remove_property(property).map(|_| ()),
        };
        if let Err(e) = result {
            log::warn!("Failed to set preview {}: {}", property, describe(&e));
        }
    }
}

/// Hidden error text placed after a field.
fn error_slot(document: &Document, field: &Element) -> Result<Element, MountError> {
    let slot = document.create_element("div")?;
    slot.set_class_name("img-upload__field-error hidden");
    field.after_with_node_1(&slot)?;
    Ok(slot)
}

fn toggle_class(element: &Element, class: &str, on: bool) {
    if let Err(e) = element.class_list().toggle_with_force(class, on) {
        log::warn!("Failed to toggle class {}: {}", class, describe(&e));
    }
}

impl Surface for DomSurface {
    fn selected_file(&self) -> Option<SelectedFile> {
        let file = self.upload.files()?.get(0)?;
        Some(SelectedFile::new(file.name(), file.type_(), file.size() as u64))
    }

    fn object_url(&mut self) -> String {
        if let Some(old) = self.object_url.take() {
            if let Err(e) = Url::revoke_object_url(&old) {
                log::warn!("Failed to revoke {}: {}", old, describe(&e));
            }
        }
        let Some(file) = self.upload.files().and_then(|files| files.get(0)) else {
            return String::new();
        };
        match Url::create_object_url_with_blob(&file) {
            Ok(url) => {
                self.object_url = Some(url.clone());
                url
            }
            Err(e) => {
                log::warn!("Could not create preview URL: {}", describe(&e));
                String::new()
            }
        }
    }

    fn set_preview(&mut self, url: &str) {
        self.preview.set_src(url);
        let background = format!("url({})", url);
        for thumbnail in &self.thumbnails {
            if let Err(e) = thumbnail.style().set_property("background-image", &background) {
                log::warn!("Failed to set thumbnail: {}", describe(&e));
            }
        }
    }

    fn set_overlay_visible(&mut self, visible: bool) {
        toggle_class(&self.overlay, "hidden", !visible);
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        toggle_class(&self.body, "modal-open", locked);
    }

    fn field_value(&self, field: Field) -> String {
        match field {
            Field::Hashtags => self.hashtags.value(),
            Field::Comment => self.comment.value(),
        }
    }

    fn set_field_error(&mut self, field: Field, message: Option<&str>) {
        let slot = self.error_element(field);
        slot.set_text_content(message);
        toggle_class(slot, "hidden", message.is_none());
    }

    fn reset_fields(&mut self) {
        self.form.reset();
    }

    fn set_submit_button(&mut self, button: &SubmitButton) {
        self.submit.set_disabled(button.disabled);
        self.submit.set_text_content(Some(&button.label));
    }

    fn set_scale(&mut self, percent: u32) {
        self.scale_value.set_value(&format!("{}%", percent));
        let transform = format!("scale({})", percent as f32 / 100.0);
        self.set_preview_style("transform", Some(&transform));
    }

    fn set_effect_slider(&mut self, range: Option<SliderRange>, value: f32) {
        toggle_class(&self.level_container, "hidden", range.is_none());
        if let Some(range) = range {
            self.slider.set_min(&range.min.to_string());
            self.slider.set_max(&range.max.to_string());
            self.slider.set_step(&range.step.to_string());
            self.slider.set_value(&format_level(value));
        }
    }

    fn set_effect_level(&mut self, level: &str) {
        self.level_value.set_value(level);
    }

    fn set_preview_filter(&mut self, filter: Option<&str>) {
        self.set_preview_style("filter", filter);
    }

    fn set_effect_choice(&mut self, effect: Effect) {
        let selector = format!("input[value=\"{}\"]", effect.name());
        match self
            .effects_list
            .query_selector(&selector)
            .ok()
            .flatten()
            .and_then(|radio| radio.dyn_into::<HtmlInputElement>().ok())
        {
            Some(radio) => radio.set_checked(true),
            None => log::warn!("No radio button for effect {}", effect),
        }
    }
}

/// Posts the form as multipart data with `fetch`.
struct FetchTransport {
    endpoint: String,
    form: HtmlFormElement,
}

impl Transport for FetchTransport {
    fn send(&self, data: FormData) -> SendFuture {
        let endpoint = self.endpoint.clone();
        let form = self.form.clone();
        Box::pin(async move { post(&endpoint, &form, &data).await })
    }
}

async fn post(endpoint: &str, form: &HtmlFormElement, data: &FormData) -> Result<(), TransportError> {
    let rejected = |e: JsValue| TransportError::rejected(describe(&e));

    let body = web_sys::FormData::new_with_form(form).map_err(rejected)?;
    for (name, value) in data.text_fields() {
        body.set_with_str(name, value).map_err(rejected)?;
    }

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&body);
    let request = Request::new_with_str_and_init(endpoint, &init).map_err(rejected)?;

    let window = web_sys::window().ok_or_else(|| TransportError::rejected("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| TransportError::network(describe(&e)))?
        .dyn_into()
        .map_err(|_| TransportError::network("fetch resolved to a non-response"))?;

    if response.ok() {
        Ok(())
    } else {
        Err(TransportError::Status {
            status: response.status(),
        })
    }
}

/// Shows the page's success and error templates.
struct DomNotifier {
    document: Document,
}

impl DomNotifier {
    fn show(&self, template_id: &str) -> Result<(), MountError> {
        let template: HtmlTemplateElement = self
            .document
            .get_element_by_id(template_id)
            .ok_or(MountError::Missing("notification template"))?
            .dyn_into()
            .map_err(|_| MountError::WrongKind("notification template"))?;
        let body = self.document.body().ok_or(MountError::Missing("body"))?;

        let Some(section) = template.content().first_element_child() else {
            return Err(MountError::Missing("notification content"));
        };
        let message: Element = section
            .clone_node_with_deep(true)?
            .dyn_into()
            .map_err(|_| MountError::WrongKind("notification content"))?;
        body.append_child(&message)?;

        let dismissed = message.clone();
        let dismiss = Closure::once_into_js(move || dismissed.remove());
        message.add_event_listener_with_callback("click", dismiss.unchecked_ref())?;
        Ok(())
    }
}

impl Notifier for DomNotifier {
    fn show_success(&mut self) {
        if let Err(e) = self.show("success") {
            log::error!("Success message not shown: {}", e);
        }
    }

    fn show_error(&mut self, error: &TransportError) {
        log::warn!("Upload failed: {}", error);
        if let Err(e) = self.show("error") {
            log::error!("Error message not shown: {}", e);
        }
    }
}
