//! Process input files according to their type.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;
use tokio::task::JoinError;
use tracing::debug;

use super::{
    image::{encode_webp, ImageError},
    input::{InputFile, RelativePath},
    minify_css::{minify_css, MinifyCssError},
    minify_html::{HtmlMinifier, MinifyHtmlError},
    minify_js::{minify_js, MinifyJsError},
    output::{copy_file, write_file},
    render_html::{HtmlRenderer, RenderHtmlError},
};
use crate::config::Config;

/// List of errors for this module.
///
/// Each error carries the path of the input file, relative to the input
/// directory.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Error reading the input file.
    #[error("In `{path}` while reading the file")]
    Read {
        /// Input file path.
        path: RelativePath,
        /// Source error.
        source: io::Error,
    },
    /// Error writing the output file.
    #[error("In `{path}` while writing {output_path:?}")]
    Write {
        /// Input file path.
        path: RelativePath,
        /// Output file path.
        output_path: PathBuf,
        /// Source error.
        source: io::Error,
    },
    /// Error rendering a HTML template.
    #[error("In `{path}` while rendering the template")]
    RenderHtml {
        /// Input file path.
        path: RelativePath,
        /// Source error.
        source: RenderHtmlError,
    },
    /// Error minifying HTML.
    #[error("In `{path}` while minifying HTML")]
    MinifyHtml {
        /// Input file path.
        path: RelativePath,
        /// Source error.
        source: MinifyHtmlError,
    },
    /// Error minifying JavaScript.
    #[error("In `{path}` while minifying JavaScript")]
    MinifyJs {
        /// Input file path.
        path: RelativePath,
        /// Source error.
        source: MinifyJsError,
    },
    /// Error minifying CSS.
    #[error("In `{path}` while minifying CSS")]
    MinifyCss {
        /// Input file path.
        path: RelativePath,
        /// Source error.
        source: MinifyCssError,
    },
    /// Error transcoding an image.
    #[error("In `{path}` while transcoding the image")]
    Image {
        /// Input file path.
        path: RelativePath,
        /// Source error.
        source: ImageError,
    },
    /// The blocking task panicked.
    #[error("In `{path}` while waiting for the blocking task")]
    Join {
        /// Input file path.
        path: RelativePath,
        /// Source error.
        source: JoinError,
    },
}

/// Transform applied to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Handler {
    /// Render as a template, then minify.
    Html,
    /// Minify JavaScript.
    Js,
    /// Copy already minified JavaScript.
    JsCopy,
    /// Minify CSS.
    Css,
    /// Copy already minified CSS.
    CssCopy,
    /// Transcode to WebP.
    Image,
    /// Copy verbatim.
    Copy,
}

impl Handler {
    /// Select the handler of a file according to its name.
    ///
    /// Extensions are compared case-insensitively.
    pub fn for_path(relative_path: &RelativePath) -> Self {
        let path = relative_path.as_path();

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let extension = path
            .extension()
            .map(|extension| extension.to_string_lossy().to_lowercase());

        match extension.as_deref() {
            Some("html") => Self::Html,
            Some("js") if file_name.ends_with(".min.js") => Self::JsCopy,
            Some("js") => Self::Js,
            Some("css") if file_name.ends_with(".min.css") => Self::CssCopy,
            Some("css") => Self::Css,
            Some("jpg" | "jpeg" | "png" | "webp" | "jfif") => Self::Image,
            _ => Self::Copy,
        }
    }

    /// Return the tag printed when a file has been processed.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::Js => "JS",
            Self::JsCopy => "JS(cp)",
            Self::Css => "CSS",
            Self::CssCopy => "CSS(cp)",
            Self::Image => "IMG",
            Self::Copy => "COPY",
        }
    }

    /// Return the output path of a file, relative to the output directory.
    ///
    /// Images get a `.webp` extension, other files keep their path.
    pub fn output_path(&self, relative_path: &RelativePath) -> PathBuf {
        let path = relative_path.as_path().to_path_buf();

        match self {
            Self::Image => path.with_extension("webp"),
            _ => path,
        }
    }
}

/// Shared state of the handlers.
pub struct HandlerContext {
    /// Directory of output files.
    output_dir: PathBuf,

    /// WebP encoding quality.
    image_quality: f32,

    /// Variables available to HTML templates.
    template_context: toml::Table,

    /// Template renderer rooted at the input directory.
    renderer: HtmlRenderer,

    /// HTML minifier.
    minifier: HtmlMinifier,
}

impl HandlerContext {
    /// Create the handler context of a build.
    pub fn new(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            image_quality: config.image_quality,
            template_context: config.context.clone(),
            renderer: HtmlRenderer::new(&config.input_dir),
            minifier: HtmlMinifier::new(),
        }
    }

    /// Render a HTML template and minify the result.
    fn render_html(&self, path: &RelativePath, template: &str) -> Result<String, HandlerError> {
        let content = self
            .renderer
            .render(path.as_str(), template, &self.template_context)
            .map_err(|source| HandlerError::RenderHtml {
                path: path.clone(),
                source,
            })?;

        self.minifier
            .minify(content, path.as_str())
            .map_err(|source| HandlerError::MinifyHtml {
                path: path.clone(),
                source,
            })
    }
}

/// A file that has been processed.
#[derive(Debug, Clone)]
pub struct Processed {
    /// Handler applied to the file.
    pub handler: Handler,

    /// Path of the input file, relative to the input directory.
    pub relative_path: RelativePath,

    /// Absolute path of the output file.
    pub output_path: PathBuf,
}

/// Process an input file and write the result to the output directory.
///
/// A progress line is printed on success.
pub async fn process(
    context: Arc<HandlerContext>,
    input: InputFile,
) -> Result<Processed, HandlerError> {
    let InputFile {
        path: input_path,
        relative_path,
    } = input;

    let handler = Handler::for_path(&relative_path);
    let output_path = context.output_dir.join(handler.output_path(&relative_path));

    debug!("{} {:?} -> {:?}", handler.tag(), input_path, output_path);

    match handler {
        Handler::Html => {
            let template = read_to_string(&relative_path, &input_path).await?;

            let content = run_blocking(&relative_path, {
                let context = context.clone();
                let relative_path = relative_path.clone();
                move || context.render_html(&relative_path, &template)
            })
            .await?;

            write(&relative_path, &output_path, content).await?;
        },
        Handler::Js => {
            let content = read_to_string(&relative_path, &input_path).await?;

            let content = run_blocking(&relative_path, {
                let relative_path = relative_path.clone();
                move || {
                    minify_js(content).map_err(|source| HandlerError::MinifyJs {
                        path: relative_path,
                        source,
                    })
                }
            })
            .await?;

            write(&relative_path, &output_path, content).await?;
        },
        Handler::Css => {
            let content = read_to_string(&relative_path, &input_path).await?;

            let content = run_blocking(&relative_path, {
                let relative_path = relative_path.clone();
                move || {
                    minify_css(content, relative_path.as_str()).map_err(|source| {
                        HandlerError::MinifyCss {
                            path: relative_path,
                            source,
                        }
                    })
                }
            })
            .await?;

            write(&relative_path, &output_path, content).await?;
        },
        Handler::Image => {
            let content =
                tokio::fs::read(&input_path)
                    .await
                    .map_err(|source| HandlerError::Read {
                        path: relative_path.clone(),
                        source,
                    })?;

            let quality = context.image_quality;

            let content = run_blocking(&relative_path, {
                let relative_path = relative_path.clone();
                move || {
                    encode_webp(&content, quality).map_err(|source| HandlerError::Image {
                        path: relative_path,
                        source,
                    })
                }
            })
            .await?;

            write(&relative_path, &output_path, content).await?;
        },
        Handler::JsCopy | Handler::CssCopy | Handler::Copy => {
            copy_file(&input_path, &output_path)
                .await
                .map_err(|source| HandlerError::Write {
                    path: relative_path.clone(),
                    output_path: output_path.clone(),
                    source,
                })?;
        },
    }

    println!("{}  → {}", handler.tag(), relative_path);

    Ok(Processed {
        handler,
        relative_path,
        output_path,
    })
}

/// Run CPU-bound work on the blocking thread pool.
async fn run_blocking<T, F>(path: &RelativePath, f: F) -> Result<T, HandlerError>
where
    F: FnOnce() -> Result<T, HandlerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|source| HandlerError::Join {
            path: path.clone(),
            source,
        })?
}

/// Read an input file as UTF-8 text.
async fn read_to_string(path: &RelativePath, input_path: &Path) -> Result<String, HandlerError> {
    tokio::fs::read_to_string(input_path)
        .await
        .map_err(|source| HandlerError::Read {
            path: path.clone(),
            source,
        })
}

/// Write an output file.
async fn write(
    path: &RelativePath,
    output_path: &Path,
    content: impl AsRef<[u8]>,
) -> Result<(), HandlerError> {
    write_file(output_path, content)
        .await
        .map_err(|source| HandlerError::Write {
            path: path.clone(),
            output_path: output_path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_fs::prelude::*;
    use predicates::prelude::*;

    use super::{process, Handler, HandlerContext, HandlerError};
    use crate::{
        build::input::{InputFile, RelativePath},
        config::Config,
    };

    fn relative_path(path: &str) -> RelativePath {
        RelativePath::new(format!("/site/{path}"), "/site").unwrap()
    }

    #[test]
    fn for_path() {
        const CASES: [(&str, Handler); 14] = [
            ("index.html", Handler::Html),
            ("blog/POST.HTML", Handler::Html),
            ("app.js", Handler::Js),
            ("vendor/jquery.min.js", Handler::JsCopy),
            ("vendor/JQUERY.MIN.JS", Handler::JsCopy),
            ("main.css", Handler::Css),
            ("reset.min.css", Handler::CssCopy),
            ("photo.png", Handler::Image),
            ("photo.JPG", Handler::Image),
            ("photo.jpeg", Handler::Image),
            ("photo.jfif", Handler::Image),
            ("photo.webp", Handler::Image),
            ("favicon.ico", Handler::Copy),
            (".htaccess", Handler::Copy),
        ];

        for (input, expected) in CASES {
            let result = Handler::for_path(&relative_path(input));
            assert_eq!(
                result, expected,
                "\nfor_path({input:?}) expected {expected:?} but received {result:?}"
            );
        }
    }

    #[test]
    fn output_path() {
        let path = relative_path("img/photo.JPG");
        assert_eq!(
            Handler::Image.output_path(&path),
            std::path::Path::new("img").join("photo.webp")
        );

        let path = relative_path("img/photo.webp");
        assert_eq!(
            Handler::Image.output_path(&path),
            std::path::Path::new("img").join("photo.webp")
        );

        let path = relative_path("css/main.css");
        assert_eq!(
            Handler::Css.output_path(&path),
            std::path::Path::new("css").join("main.css")
        );
    }

    fn setup() -> (assert_fs::TempDir, Arc<HandlerContext>) {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("site").create_dir_all().unwrap();

        let mut context = toml::Table::new();
        context.insert("title".into(), "Home".into());

        let config = Config {
            input_dir: dir.path().join("site"),
            output_dir: dir.path().join("cache"),
            context,
            ..Default::default()
        };

        (dir, Arc::new(HandlerContext::new(&config)))
    }

    fn input(dir: &assert_fs::TempDir, path: &str) -> InputFile {
        InputFile {
            path: dir.path().join("site").join(path),
            relative_path: relative_path(path),
        }
    }

    #[tokio::test]
    async fn process_html() {
        let (dir, context) = setup();
        dir.child("site/pages/index.html")
            .write_str("<html>\n  <body>\n    <!-- todo -->\n    <h1>{{ title }}</h1>\n  </body>\n</html>\n")
            .unwrap();

        let processed = process(context, input(&dir, "pages/index.html"))
            .await
            .unwrap();

        assert_eq!(processed.handler, Handler::Html);
        dir.child("cache/pages/index.html")
            .assert(predicate::str::contains("<h1>Home</h1>"))
            .assert(predicate::str::contains("todo").not())
            .assert(predicate::str::contains("\n").not());
    }

    #[tokio::test]
    async fn process_hidden_html() {
        let (dir, context) = setup();
        dir.child("site/.well-known/index.html")
            .write_str("<p>{{ title }}</p>")
            .unwrap();

        process(context, input(&dir, ".well-known/index.html"))
            .await
            .unwrap();

        dir.child("cache/.well-known/index.html")
            .assert(predicate::str::contains("Home"));
    }

    #[tokio::test]
    async fn process_min_js_copy() {
        let (dir, context) = setup();
        let content = "var a = 1;\n\n";
        dir.child("site/lib.min.js").write_str(content).unwrap();

        process(context, input(&dir, "lib.min.js")).await.unwrap();

        dir.child("cache/lib.min.js").assert(content);
    }

    #[tokio::test]
    async fn process_invalid_css() {
        let (dir, context) = setup();
        dir.child("site/css/broken.css")
            .write_str("..foo { color: red; }")
            .unwrap();

        let result = process(context, input(&dir, "css/broken.css")).await;

        match result {
            Err(HandlerError::MinifyCss { path, .. }) => assert_eq!(path.as_str(), "css/broken.css"),
            other => panic!("unexpected result {other:?}"),
        }
        dir.child("cache/css/broken.css")
            .assert(predicate::path::missing());
    }

    #[tokio::test]
    async fn process_image() {
        let (dir, context) = setup();
        dir.child("site/img").create_dir_all().unwrap();
        image::RgbImage::from_pixel(4, 4, image::Rgb([0, 128, 255]))
            .save(dir.child("site/img/photo.png").path())
            .unwrap();

        let processed = process(context, input(&dir, "img/photo.png")).await.unwrap();

        assert_eq!(processed.output_path, dir.path().join("cache/img/photo.webp"));
        dir.child("cache/img/photo.webp")
            .assert(predicate::path::is_file());
        dir.child("cache/img/photo.png")
            .assert(predicate::path::missing());
    }
}
