use crate::{
    error::{Result, WallpaperError},
    models::GeneratedImage,
};
use std::path::{Path, PathBuf};

const FILE_NAME_PROMPT_CHARS: usize = 20;

/// Characters that cannot appear in a file name on common platforms.
fn is_forbidden_in_file_name(c: char) -> bool {
    matches!(c, '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*') || c.is_control()
}

/// File name for an exported wallpaper: the first 20 characters of the
/// prompt, whitespace runs collapsed to `_`, then `_wallpaper.png`.
/// Path separators and other characters not allowed in file names become `_`,
/// as does a stem made only of dots.
///
/// Counts Unicode scalars and uses `char::is_whitespace`, so prompts with
/// astral-plane characters (emoji) can differ from a UTF-16 `substring(0, 20)`.
pub fn download_file_name(prompt: &str) -> String {
    let mut stem = String::with_capacity(FILE_NAME_PROMPT_CHARS);
    let mut in_whitespace = false;

    for c in prompt.chars().take(FILE_NAME_PROMPT_CHARS) {
        if c.is_whitespace() {
            if !in_whitespace {
                stem.push('_');
            }
            in_whitespace = true;
        } else if is_forbidden_in_file_name(c) {
            stem.push('_');
            in_whitespace = false;
        } else {
            stem.push(c);
            in_whitespace = false;
        }
    }

    if !stem.is_empty() && stem.chars().all(|c| c == '.') {
        stem = "_".repeat(stem.len());
    }

    format!("{}_wallpaper.png", stem)
}

/// Decode `image` and write it into `dir` under the prompt-derived name.
pub async fn save_image(image: &GeneratedImage, prompt: &str, dir: &Path) -> Result<PathBuf> {
    let bytes = image.decode()?;
    let path = dir.join(download_file_name(prompt));
    if path.parent() != Some(dir) {
        return Err(WallpaperError::DownloadError(format!(
            "refusing to write outside {}",
            dir.display()
        )));
    }

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, &bytes).await?;

    log::info!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_before_replacing_whitespace() {
        assert_eq!(
            download_file_name("Bioluminescent forest at night"),
            "Bioluminescent_fores_wallpaper.png"
        );
    }

    #[test]
    fn test_collapses_whitespace_runs() {
        assert_eq!(download_file_name("a  \t b"), "a_b_wallpaper.png");
        assert_eq!(download_file_name(" lead"), "_lead_wallpaper.png");
    }

    #[test]
    fn test_short_and_empty_prompts() {
        assert_eq!(download_file_name("koi"), "koi_wallpaper.png");
        assert_eq!(download_file_name(""), "_wallpaper.png");
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        assert_eq!(
            download_file_name("ñññññññññññññññññññññ"),
            "ññññññññññññññññññññ_wallpaper.png"
        );
    }

    #[test]
    fn test_path_characters_never_leave_the_file_name() {
        assert_eq!(
            download_file_name("AC/DC concert poster"),
            "AC_DC_concert_poster_wallpaper.png"
        );
        assert_eq!(download_file_name("/etc/x"), "_etc_x_wallpaper.png");
        assert_eq!(download_file_name("../escape"), ".._escape_wallpaper.png");
        assert_eq!(download_file_name(r"a\b:c*?"), "a_b_c___wallpaper.png");
        assert_eq!(download_file_name(".."), "___wallpaper.png");
        assert_eq!(download_file_name(". ."), "._._wallpaper.png");
    }

    #[tokio::test]
    async fn test_save_image_stays_in_target_dir() {
        let dir = tempfile::tempdir().unwrap();
        let image = GeneratedImage::new("image/png", "aGVsbG8=");

        for prompt in ["AC/DC concert poster", "/tmp/x", "../escape", ".."] {
            let path = save_image(&image, prompt, dir.path()).await.unwrap();
            assert_eq!(path.parent(), Some(dir.path()));
            assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        }
    }

    #[tokio::test]
    async fn test_save_image_writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let image = GeneratedImage::new("image/png", "aGVsbG8=");

        let path = save_image(&image, "sunset sky", dir.path()).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "sunset_sky_wallpaper.png");
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }
}
