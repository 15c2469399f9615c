use crate::handlers::{self, OpenRequest, SharedSession};
use crate::wm::{PointerEvent, Viewport};
use warp::Filter;

pub(super) fn routes(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    list_windows(session.clone())
        .or(open_window(session.clone()))
        .or(close_all(session.clone()))
        .or(pointer_down(session.clone()))
        .or(window_action(session.clone()))
        .or(pointer(session.clone()))
        .or(set_viewport(session.clone()))
        .or(drain_surface(session.clone()))
}

fn list_windows(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("windows")
        .and(warp::get())
        .map(move || handlers::list_windows(session.clone()))
}

fn open_window(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("windows")
        .and(warp::post())
        .and(warp::body::json::<OpenRequest>())
        .map(move |request| handlers::open_window(session.clone(), request))
}

fn close_all(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("windows")
        .and(warp::delete())
        .map(move || handlers::close_all(session.clone()))
}

// Must come before `window_action`, which would otherwise claim "pointer" as an action.
fn pointer_down(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("windows" / String / "pointer")
        .and(warp::post())
        .and(warp::body::json::<PointerEvent>())
        .map(move |id, event| handlers::pointer_down(session.clone(), id, event))
}

fn window_action(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("windows" / String / String)
        .and(warp::post())
        .map(move |id, action| handlers::window_action(session.clone(), id, action))
}

fn pointer(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("pointer")
        .and(warp::post())
        .and(warp::body::json::<PointerEvent>())
        .map(move |event| handlers::pointer(session.clone(), event))
}

fn set_viewport(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("viewport")
        .and(warp::post())
        .and(warp::body::json::<Viewport>())
        .map(move |viewport| handlers::set_viewport(session.clone(), viewport))
}

fn drain_surface(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("surface" / "commands")
        .and(warp::get())
        .map(move || handlers::drain_surface(session.clone()))
}
