use crate::errors::{DeskError, DeskErrorType, Result};
use crate::session::Session;
use crate::wm::{
    Control, OpenOptions, PointerEvent, PointerKind, Viewport, WindowContent, WindowId,
};

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::instrument;
use warp::http::StatusCode;
use warp::reply::{Reply, Response};

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Debug, Deserialize)]
pub struct OpenRequest {
    pub app_id: String,
    #[serde(default)]
    pub title: String,
    pub content: WindowContent,
    #[serde(default)]
    pub options: OpenOptions,
}

#[derive(Serialize)]
struct OpenReply {
    id: WindowId,
}

fn lock(session: &SharedSession) -> Result<MutexGuard<'_, Session>> {
    session.lock().map_err(|_| {
        tracing::error!("Session lock poisoned");
        DeskError::new(
            DeskErrorType::InternalError,
            "Session state is unavailable".to_string(),
        )
    })
}

fn respond<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(value) => warp::reply::with_status(warp::reply::json(&value), StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}

pub(crate) fn missing(param: &str) -> Response {
    tracing::error!("Query missing {} argument", param);
    warp::reply::with_status(
        warp::reply::json(&format!("Missing {} argument", param)),
        StatusCode::BAD_REQUEST,
    )
    .into_response()
}

fn parse_window_id(id: &str) -> Result<WindowId> {
    id.parse().map_err(|_| {
        DeskError::new(
            DeskErrorType::InvalidPath,
            format!("Not a window id: {}", id),
        )
    })
}

#[instrument(name = "handlers.get_version", level = "info")]
pub(crate) fn get_version() -> Response {
    respond(Ok(env!("CARGO_PKG_VERSION").to_string()))
}

#[instrument(name = "handlers.list_dir", level = "info", skip(session))]
pub(crate) fn list_dir(session: SharedSession, path: Option<String>) -> Response {
    respond(lock(&session).and_then(|s| s.vfs.list(path.as_deref())))
}

#[instrument(name = "handlers.change_dir", level = "info", skip(session))]
pub(crate) fn change_dir(session: SharedSession, path: String) -> Response {
    respond(lock(&session).and_then(|mut s| s.vfs.change_directory(&path)))
}

#[instrument(name = "handlers.current_dir", level = "info", skip(session))]
pub(crate) fn current_dir(session: SharedSession) -> Response {
    respond(lock(&session).map(|s| s.vfs.current_path()))
}

#[instrument(name = "handlers.make_dir", level = "info", skip(session))]
pub(crate) fn make_dir(session: SharedSession, name: String) -> Response {
    respond(lock(&session).and_then(|mut s| s.vfs.make_directory(&name)))
}

#[instrument(
    name = "handlers.create_file",
    level = "info",
    skip(session, body),
    fields(size = body.len())
)]
pub(crate) fn create_file(session: SharedSession, name: String, body: Vec<u8>) -> Response {
    let result = String::from_utf8(body)
        .map_err(|e| {
            DeskError::new(
                DeskErrorType::InvalidContent,
                format!("File content is not valid UTF-8: {}", e),
            )
        })
        .and_then(|content| {
            let mut s = lock(&session)?;
            s.vfs.create_file(&name, &content)
        });
    respond(result)
}

#[instrument(name = "handlers.read_file", level = "info", skip(session))]
pub(crate) fn read_file(session: SharedSession, name: String) -> Response {
    respond(lock(&session).and_then(|s| s.vfs.read_file(&name)))
}

#[instrument(name = "handlers.export_tree", level = "info", skip(session))]
pub(crate) fn export_tree(session: SharedSession) -> Response {
    respond(lock(&session).and_then(|s| s.vfs.snapshot()))
}

#[instrument(name = "handlers.list_windows", level = "info", skip(session))]
pub(crate) fn list_windows(session: SharedSession) -> Response {
    respond(lock(&session).map(|s| {
        serde_json::json!({
            "windows": s.wm.windows(),
            "taskbar": s.wm.taskbar().entries(),
            "active": s.wm.active(),
        })
    }))
}

#[instrument(name = "handlers.open_window", level = "info", skip(session, request), fields(app_id = %request.app_id))]
pub(crate) fn open_window(session: SharedSession, request: OpenRequest) -> Response {
    respond(lock(&session).map(|mut s| {
        let id = s.wm.open(
            &request.app_id,
            &request.title,
            request.content,
            &request.options,
        );
        OpenReply { id }
    }))
}

#[instrument(name = "handlers.window_action", level = "info", skip(session))]
pub(crate) fn window_action(session: SharedSession, id: String, action: String) -> Response {
    let result = parse_window_id(&id).and_then(|id| {
        let mut s = lock(&session)?;
        match action.as_str() {
            "focus" => s.wm.focus(id),
            "taskbar" => s.wm.taskbar_click(id),
            "minimize" => s.wm.activate_control(id, Control::Minimize),
            "maximize" => s.wm.activate_control(id, Control::Maximize),
            "close" => s.wm.activate_control(id, Control::Close),
            // only reached when the pointer route could not decode the body
            "pointer" => {
                return Err(DeskError::new(
                    DeskErrorType::InvalidContent,
                    "Invalid pointer event".to_string(),
                ))
            }
            other => {
                return Err(DeskError::new(
                    DeskErrorType::InvalidPath,
                    format!("Unknown window action: {}", other),
                ))
            }
        }
        let window = s.wm.window(id).cloned();
        Ok(window)
    });
    respond(result)
}

#[instrument(name = "handlers.pointer_down", level = "debug", skip(session))]
pub(crate) fn pointer_down(session: SharedSession, id: String, event: PointerEvent) -> Response {
    let result = parse_window_id(&id).and_then(|id| {
        let mut s = lock(&session)?;
        Ok(s.wm.pointer_down(id, &event))
    });
    respond(result)
}

#[instrument(name = "handlers.pointer", level = "debug", skip(session))]
pub(crate) fn pointer(session: SharedSession, event: PointerEvent) -> Response {
    let result = match event.kind {
        PointerKind::Down => Err(DeskError::new(
            DeskErrorType::InvalidContent,
            "Pointer presses are sent to /windows/<id>/pointer".to_string(),
        )),
        PointerKind::Move => lock(&session).map(|mut s| s.wm.pointer_move(&event)),
        PointerKind::Up => lock(&session).map(|mut s| s.wm.pointer_up(&event)),
    };
    respond(result)
}

#[instrument(name = "handlers.close_all", level = "info", skip(session))]
pub(crate) fn close_all(session: SharedSession) -> Response {
    respond(lock(&session).map(|mut s| {
        s.wm.close_all();
        "Closed all windows".to_string()
    }))
}

#[instrument(name = "handlers.set_viewport", level = "info", skip(session))]
pub(crate) fn set_viewport(session: SharedSession, viewport: Viewport) -> Response {
    respond(lock(&session).map(|mut s| {
        s.wm.set_viewport(viewport);
        viewport
    }))
}

#[instrument(name = "handlers.drain_surface", level = "debug", skip(session))]
pub(crate) fn drain_surface(session: SharedSession) -> Response {
    respond(lock(&session).map(|mut s| s.wm.surface_mut().drain()))
}
