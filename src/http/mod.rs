//! HTTP transport behind the request loop.
mod client;


pub use client::{ClientFactory, HttpClient, HttpResponse, ReqwestClient, ReqwestFactory};
