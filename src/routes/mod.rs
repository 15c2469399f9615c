mod files;
mod windows;

use crate::handlers::{self, SharedSession};
use warp::Filter;

pub fn routes(
    session: SharedSession,
) -> impl warp::Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    get_version()
        .or(files::routes(session.clone()))
        .or(windows::routes(session.clone()))
}

fn get_version() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("version")
        .and(warp::get())
        .map(handlers::get_version)
}
