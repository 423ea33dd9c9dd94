pub mod app_data;
pub mod app_error;
pub mod auth;
pub mod controller;
pub mod images;
pub mod mailer;
pub mod output;
pub mod server;
pub mod services;
pub mod stores;

#[cfg(test)]
mod test_util;

use zettanews_media as media;
use zettanews_mongo as mongo;
use zettanews_utils as utils;
