use crate::handlers::{self, SharedSession};
use std::collections::HashMap;
use tracing::instrument;
use warp::Filter;

pub(super) fn routes(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    list_dir(session.clone())
        .or(change_dir(session.clone()))
        .or(current_dir(session.clone()))
        .or(make_dir(session.clone()))
        .or(create_file(session.clone()))
        .or(read_file(session.clone()))
        .or(export_tree(session.clone()))
}

#[instrument(skip(session))]
fn list_dir(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("vfs" / "ls")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .map(move |mut params: HashMap<String, String>| {
            handlers::list_dir(session.clone(), params.remove("path"))
        })
}

#[instrument(skip(session))]
fn change_dir(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("vfs" / "cd")
        .and(warp::post())
        .and(warp::query::<HashMap<String, String>>())
        .map(
            move |mut params: HashMap<String, String>| match params.remove("path") {
                Some(path) => handlers::change_dir(session.clone(), path),
                None => handlers::missing("path"),
            },
        )
}

#[instrument(skip(session))]
fn current_dir(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("vfs" / "pwd")
        .and(warp::get())
        .map(move || handlers::current_dir(session.clone()))
}

#[instrument(skip(session))]
fn make_dir(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("vfs" / "mkdir")
        .and(warp::post())
        .and(warp::query::<HashMap<String, String>>())
        .map(
            move |mut params: HashMap<String, String>| match params.remove("name") {
                Some(name) => handlers::make_dir(session.clone(), name),
                None => handlers::missing("name"),
            },
        )
}

#[instrument(skip(session))]
fn create_file(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // The request body is the file content and must be UTF-8. An empty body makes an empty file.
    warp::path!("vfs" / "touch")
        .and(warp::post())
        .and(warp::query::<HashMap<String, String>>())
        .and(warp::body::content_length_limit(1024 * 1024))
        .and(warp::body::bytes())
        .map(
            move |mut params: HashMap<String, String>, body: warp::hyper::body::Bytes| {
                match params.remove("name") {
                    Some(name) => handlers::create_file(session.clone(), name, body.to_vec()),
                    None => handlers::missing("name"),
                }
            },
        )
}

#[instrument(skip(session))]
fn read_file(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("vfs" / "cat")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .map(
            move |mut params: HashMap<String, String>| match params.remove("name") {
                Some(name) => handlers::read_file(session.clone(), name),
                None => handlers::missing("name"),
            },
        )
}

#[instrument(skip(session))]
fn export_tree(
    session: SharedSession,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("vfs" / "export")
        .and(warp::get())
        .map(move || handlers::export_tree(session.clone()))
}
