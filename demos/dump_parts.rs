use log::{debug, error, info};
use multipart_stream::{MultipartStreamReader, ReadOutcome};
use std::{fs::File, io::BufReader, ops::ControlFlow};

fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let path = std::env::var("MULTIPART_FILE").expect("MULTIPART_FILE must be set");
    let boundary = std::env::var("MULTIPART_BOUNDARY").expect("MULTIPART_BOUNDARY must be set");
    let max_parts = std::env::var("MULTIPART_MAX_PARTS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok());

    let file = File::open(&path).expect("Failed to open MULTIPART_FILE");
    let mut reader = MultipartStreamReader::new(BufReader::new(file), boundary)
        .expect("Invalid boundary");

    let mut seen = 0;
    let res = reader.read_all_parts(|headers, body, is_last| {
        seen += 1;
        debug!("==========================================");
        debug!("New part (body size: {}, last: {}):", body.len(), is_last);

        for (name, value) in headers.iter() {
            debug!("Header: {}: {}", name, value);
        }

        match max_parts {
            Some(max) if seen >= max => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    });

    match res {
        Ok(ReadOutcome::Completed) => info!("Read {} parts from {}", seen, path),
        Ok(ReadOutcome::StoppedEarly) => info!("Stopped after {} parts", seen),
        Err(e) => error!("Reading {}: {}", path, e),
    }
}
