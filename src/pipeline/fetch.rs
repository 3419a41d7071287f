//! Stage 2: authenticate and download raw images.

use std::fs;
use std::path::Path;

use image::{DynamicImage, ImageDecoder, ImageReader};
use log::{info, warn};

use super::resolve::FilenameList;
use crate::error::HarvestError;
use crate::remote::ImageService;
use crate::workspace::Workspace;

/// Stage 2 output: the filename list carried forward, plus which files
/// were actually downloaded this run. Later stages iterate the full list;
/// a payload can exist for an image whose download failed.
#[derive(Clone, Debug)]
pub struct FetchedImages {
    file_names: FilenameList,
    downloaded: Vec<String>,
}

impl FetchedImages {
    pub fn new(file_names: FilenameList, downloaded: Vec<String>) -> Self {
        Self {
            file_names,
            downloaded,
        }
    }

    pub fn file_names(&self) -> &FilenameList {
        &self.file_names
    }

    pub fn downloaded(&self) -> &[String] {
        &self.downloaded
    }
}

/// Authenticates once, then downloads each resolved image into
/// `raw_images/`.
///
/// Authentication failure is stage-fatal. Everything after that is
/// per-file: a failed download, save, or decode is logged and the stage
/// moves on. Saved images are EXIF-normalized in place so all later
/// dimension math sees the corrected orientation.
pub fn fetch_images(
    filenames: &FilenameList,
    service: &mut dyn ImageService,
    workspace: &Workspace,
) -> Result<FetchedImages, HarvestError> {
    service.authenticate()?;
    info!("login successful");

    let mut downloaded = Vec::new();
    for file_name in filenames.file_names() {
        match service.fetch_image(file_name) {
            Ok(Some(bytes)) => {
                let path = workspace.raw_image_path(file_name);
                if let Err(err) = fs::write(&path, &bytes) {
                    warn!("failed to save {}: {err}", path.display());
                    continue;
                }
                match normalize_orientation(&path) {
                    Ok(()) => info!("downloaded and processed: {file_name}"),
                    Err(err) => warn!("image processing error: {file_name}: {err}"),
                }
                downloaded.push(file_name.clone());
            }
            Ok(None) => warn!("failed to download: {file_name}"),
            Err(err) => warn!("error downloading {file_name}: {err}"),
        }
    }

    Ok(FetchedImages::new(filenames.clone(), downloaded))
}

/// Rewrites the image in place so the pixel data matches its
/// EXIF-declared orientation. Re-encoding drops the orientation tag.
fn normalize_orientation(path: &Path) -> Result<(), image::ImageError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut decoded = DynamicImage::from_decoder(decoder)?;
    decoded.apply_orientation(orientation);
    decoded.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Cursor;

    struct ScriptedService {
        authenticated: bool,
        auth_fails: bool,
        responses: BTreeMap<String, Result<Option<Vec<u8>>, String>>,
    }

    impl ScriptedService {
        fn new() -> Self {
            Self {
                authenticated: false,
                auth_fails: false,
                responses: BTreeMap::new(),
            }
        }
    }

    impl ImageService for ScriptedService {
        fn authenticate(&mut self) -> Result<(), HarvestError> {
            if self.auth_fails {
                return Err(HarvestError::AuthenticationFailed {
                    message: "bad credentials".into(),
                });
            }
            self.authenticated = true;
            Ok(())
        }

        fn fetch_image(&mut self, file_name: &str) -> Result<Option<Vec<u8>>, HarvestError> {
            assert!(self.authenticated, "fetch before authenticate");
            match self.responses.get(file_name) {
                Some(Ok(bytes)) => Ok(bytes.clone()),
                Some(Err(message)) => Err(HarvestError::Service {
                    message: message.clone(),
                }),
                None => Ok(None),
            }
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        image::RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn auth_failure_is_stage_fatal() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let workspace = Workspace::create(temp.path()).expect("create workspace");
        let mut service = ScriptedService::new();
        service.auth_fails = true;
        let filenames = FilenameList::from_names(vec!["a.png".into()]);

        let err = fetch_images(&filenames, &mut service, &workspace).unwrap_err();
        assert!(matches!(err, HarvestError::AuthenticationFailed { .. }));
        assert!(!workspace.raw_image_path("a.png").exists());
    }

    #[test]
    fn per_file_failures_do_not_stop_the_stage() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let workspace = Workspace::create(temp.path()).expect("create workspace");

        let mut service = ScriptedService::new();
        service
            .responses
            .insert("good.png".into(), Ok(Some(png_bytes(4, 4))));
        service
            .responses
            .insert("missing.png".into(), Ok(None));
        service
            .responses
            .insert("flaky.png".into(), Err("connection reset".into()));
        // Corrupt bytes still get saved; only the orientation pass fails.
        service
            .responses
            .insert("corrupt.png".into(), Ok(Some(vec![0xde, 0xad, 0xbe, 0xef])));

        let filenames = FilenameList::from_names(vec![
            "good.png".into(),
            "missing.png".into(),
            "flaky.png".into(),
            "corrupt.png".into(),
        ]);

        let fetched = fetch_images(&filenames, &mut service, &workspace).expect("fetch");

        assert_eq!(fetched.downloaded(), ["good.png", "corrupt.png"]);
        assert!(workspace.raw_image_path("good.png").is_file());
        assert!(workspace.raw_image_path("corrupt.png").is_file());
        assert!(!workspace.raw_image_path("missing.png").exists());
        assert!(!workspace.raw_image_path("flaky.png").exists());
        // The carried-forward list still covers every filename.
        assert_eq!(fetched.file_names().len(), 4);
    }

    #[test]
    fn downloaded_images_decode_after_normalization() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let workspace = Workspace::create(temp.path()).expect("create workspace");

        let mut service = ScriptedService::new();
        service
            .responses
            .insert("img.png".into(), Ok(Some(png_bytes(6, 3))));
        let filenames = FilenameList::from_names(vec!["img.png".into()]);

        fetch_images(&filenames, &mut service, &workspace).expect("fetch");

        let decoded = image::open(workspace.raw_image_path("img.png")).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (6, 3));
    }
}
