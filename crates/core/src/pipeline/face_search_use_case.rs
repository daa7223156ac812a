use std::path::{Path, PathBuf};

use crate::detection::domain::face_extractor::FaceExtractor;
use crate::pipeline::infrastructure::threaded_search_executor::ThreadedSearchExecutor;
use crate::pipeline::search_executor::{
    CandidateOutcome, ProgressFn, SearchExecutor, SequentialSearchExecutor,
};
use crate::recognition::domain::embedding::Embedding;
use crate::recognition::domain::face_recogniser::FaceRecogniser;
use crate::shared::image::Image;
use crate::shared::image_file_reader::read_image;

/// Finds candidate images containing the person shown in a reference image.
///
/// Two states: uninitialised (no reference embedding) and initialised.
/// [`init`](Self::init) moves to initialised only when the reference
/// yields a face; searching while uninitialised returns no matches and
/// never touches the candidates.
pub struct FaceSearchUseCase {
    extractor: FaceExtractor,
    recogniser: FaceRecogniser,
    executor: Box<dyn SearchExecutor>,
    reference: Option<Embedding>,
    on_progress: Option<Box<ProgressFn<'static>>>,
}

impl FaceSearchUseCase {
    pub fn new(extractor: FaceExtractor, recogniser: FaceRecogniser) -> Self {
        Self {
            extractor,
            recogniser,
            executor: Box::new(SequentialSearchExecutor),
            reference: None,
            on_progress: None,
        }
    }

    pub fn with_executor(mut self, executor: Box<dyn SearchExecutor>) -> Self {
        self.executor = executor;
        self
    }

    /// Evaluate candidates on `workers` threads; 0 or 1 stays on the calling thread.
    pub fn with_workers(self, workers: usize) -> Self {
        if workers > 1 {
            self.with_executor(Box::new(ThreadedSearchExecutor::new(workers)))
        } else {
            self.with_executor(Box::new(SequentialSearchExecutor))
        }
    }

    pub fn with_progress(mut self, on_progress: Box<ProgressFn<'static>>) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn is_initialised(&self) -> bool {
        self.reference.is_some()
    }

    pub fn reference_embedding(&self) -> Option<&Embedding> {
        self.reference.as_ref()
    }

    pub fn recogniser(&self) -> &FaceRecogniser {
        &self.recogniser
    }

    /// Toggle jitter. A reference embedded under the old setting is no
    /// longer comparable, so changing the flag drops it.
    pub fn set_jitter(&mut self, state: bool) {
        if self.recogniser.jitter() != state {
            self.recogniser.set_jitter(state);
            if self.reference.take().is_some() {
                log::info!("Jitter changed; reference face must be set again");
            }
        }
    }

    /// Load the reference image and embed its face.
    ///
    /// An unreadable reference file is an error. A reference without any
    /// face is not: it leaves the search uninitialised and returns `false`.
    pub fn init(&mut self, reference: &Path) -> Result<bool, Box<dyn std::error::Error>> {
        let image = read_image(reference)?;
        self.init_from_image(&image)
    }

    pub fn init_from_image(&mut self, image: &Image) -> Result<bool, Box<dyn std::error::Error>> {
        self.reference = None;
        let faces = self.extractor.extract_faces(image)?;
        match faces.len() {
            0 => {
                log::warn!("No face found in the reference image");
                return Ok(false);
            }
            1 => {}
            n => log::warn!("Reference image contains {n} faces, using the first one"),
        }
        self.reference = Some(self.recogniser.get_embedding(&faces[0])?);
        Ok(true)
    }

    /// Paths of the candidates with at least one face matching the reference,
    /// sorted and without duplicates.
    ///
    /// Candidates that fail to decode are skipped with a warning. Any
    /// detection or embedding failure fails the whole search.
    pub fn search(
        &self,
        candidates: &[PathBuf],
    ) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
        let Some(reference) = &self.reference else {
            log::warn!("No reference face set, search returns no matches");
            return Ok(Vec::new());
        };

        let evaluate = |path: &Path| self.evaluate(reference, path);
        let outcomes = self
            .executor
            .execute(candidates, &evaluate, self.on_progress.as_deref());

        let mut matches = Vec::new();
        let mut failures = Vec::new();
        for (path, outcome) in outcomes {
            match outcome {
                CandidateOutcome::Match => matches.push(path),
                CandidateOutcome::NoMatch => {}
                CandidateOutcome::Skipped(reason) => {
                    log::warn!("Skipping {}: {reason}", path.display())
                }
                CandidateOutcome::Failed(reason) => failures.push((path, reason)),
            }
        }
        if let Some((path, reason)) = failures.into_iter().min() {
            return Err(format!("{}: {reason}", path.display()).into());
        }

        matches.sort();
        matches.dedup();
        log::info!(
            "{} of {} candidate(s) matched",
            matches.len(),
            candidates.len()
        );
        Ok(matches)
    }

    /// One-shot [`init`](Self::init) followed by [`search`](Self::search).
    pub fn search_with_template(
        &mut self,
        reference: &Path,
        candidates: &[PathBuf],
    ) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
        self.init(reference)?;
        self.search(candidates)
    }

    fn evaluate(&self, reference: &Embedding, path: &Path) -> CandidateOutcome {
        let image = match read_image(path) {
            Ok(image) => image,
            Err(e) => return CandidateOutcome::Skipped(e.to_string()),
        };
        match self.matches_any(reference, &image) {
            Ok(true) => CandidateOutcome::Match,
            Ok(false) => CandidateOutcome::NoMatch,
            Err(e) => CandidateOutcome::Failed(e.to_string()),
        }
    }

    fn matches_any(
        &self,
        reference: &Embedding,
        image: &Image,
    ) -> Result<bool, Box<dyn std::error::Error>> {
        let faces = self.extractor.extract_faces(image)?;
        let embeddings = self.recogniser.get_embeddings(&faces)?;
        Ok(embeddings
            .iter()
            .any(|e| self.recogniser.matches(reference, e)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::detection::domain::face_extractor::tests::{
        BoxAnchoredLandmarks, FractionalDetector,
    };
    use crate::detection::domain::image_scaler::ScalingConfig;
    use crate::recognition::domain::face_recogniser::tests::{mean_colour, MeanColourNetwork};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    pub(crate) const RED: [u8; 3] = [200, 0, 0];
    pub(crate) const BLUE: [u8; 3] = [0, 0, 200];

    /// A single centred face whose padded chip stays inside the image.
    pub(crate) const CENTRED_FACE: (f64, f64, f64, f64) = (0.25, 0.25, 0.5, 0.5);
    /// Two faces, one in each half.
    pub(crate) const LEFT_FACE: (f64, f64, f64, f64) = (0.1, 0.3, 0.3, 0.3);
    pub(crate) const RIGHT_FACE: (f64, f64, f64, f64) = (0.6, 0.3, 0.3, 0.3);

    pub(crate) fn write_solid(dir: &Path, name: &str, rgb: [u8; 3]) -> PathBuf {
        write_split(dir, name, rgb, rgb)
    }

    /// 32×32 image, left half `left`, right half `right`.
    pub(crate) fn write_split(dir: &Path, name: &str, left: [u8; 3], right: [u8; 3]) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbImage::from_fn(32, 32, |x, _| {
            image::Rgb(if x < 16 { left } else { right })
        });
        img.save(&path).unwrap();
        path
    }

    pub(crate) fn test_scaling() -> ScalingConfig {
        ScalingConfig {
            max_scaling_length: 64,
            max_scaling_times: 1,
        }
    }

    pub(crate) fn extractor_with(detector: FractionalDetector) -> FaceExtractor {
        FaceExtractor::new(Box::new(detector), Box::new(BoxAnchoredLandmarks), test_scaling())
            .unwrap()
    }

    pub(crate) fn recogniser() -> FaceRecogniser {
        FaceRecogniser::new(Box::new(MeanColourNetwork::new()), 0.6, false, Some(11)).unwrap()
    }

    fn use_case(boxes: Vec<(f64, f64, f64, f64)>) -> (FaceSearchUseCase, Arc<AtomicUsize>) {
        let detector = FractionalDetector::new(boxes);
        let calls = detector.calls.clone();
        (
            FaceSearchUseCase::new(extractor_with(detector), recogniser()),
            calls,
        )
    }

    /// Reference plus 4 red and 4 blue candidates with slightly varying shades.
    fn fixture(dir: &Path) -> (PathBuf, Vec<PathBuf>, Vec<PathBuf>) {
        let reference = write_solid(dir, "reference.png", RED);
        let reds: Vec<PathBuf> = [[200, 0, 0], [210, 5, 5], [195, 0, 0], [205, 0, 3]]
            .iter()
            .enumerate()
            .map(|(i, &rgb)| write_solid(dir, &format!("same_{i}.png"), rgb))
            .collect();
        let blues: Vec<PathBuf> = [[0, 0, 200], [5, 5, 210], [0, 0, 195], [0, 3, 205]]
            .iter()
            .enumerate()
            .map(|(i, &rgb)| write_solid(dir, &format!("other_{i}.png"), rgb))
            .collect();
        (reference, reds, blues)
    }

    fn interleaved(a: &[PathBuf], b: &[PathBuf]) -> Vec<PathBuf> {
        a.iter().zip(b).flat_map(|(x, y)| [y.clone(), x.clone()]).collect()
    }

    #[test]
    fn test_search_returns_exactly_matching_paths_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let (reference, reds, blues) = fixture(dir.path());
        let (mut search, _) = use_case(vec![CENTRED_FACE]);

        let found = search
            .search_with_template(&reference, &interleaved(&reds, &blues))
            .unwrap();

        let mut expected = reds.clone();
        expected.sort();
        assert_eq!(found, expected);
        assert!(blues.iter().all(|b| !found.contains(b)));
    }

    #[test]
    fn test_parallel_search_matches_sequential() {
        let dir = tempfile::tempdir().unwrap();
        let (reference, reds, blues) = fixture(dir.path());
        let candidates = interleaved(&reds, &blues);

        let (mut sequential, _) = use_case(vec![CENTRED_FACE]);
        let (parallel, _) = use_case(vec![CENTRED_FACE]);
        let mut parallel = parallel.with_workers(3);

        let a = sequential.search_with_template(&reference, &candidates).unwrap();
        let b = parallel.search_with_template(&reference, &candidates).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn test_reference_without_faces_stays_uninitialised() {
        let dir = tempfile::tempdir().unwrap();
        let (reference, reds, _) = fixture(dir.path());
        let (mut search, calls) = use_case(vec![]);

        assert!(!search.init(&reference).unwrap());
        assert!(!search.is_initialised());
        let calls_after_init = calls.load(Ordering::SeqCst);

        assert!(search.search(&reds).unwrap().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), calls_after_init);
    }

    #[test]
    fn test_search_before_init_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (_, reds, _) = fixture(dir.path());
        let (search, calls) = use_case(vec![CENTRED_FACE]);
        assert!(search.search(&reds).unwrap().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_reference_file_is_an_error() {
        let (mut search, _) = use_case(vec![CENTRED_FACE]);
        assert!(search.init(Path::new("/no/such/reference.png")).is_err());
        assert!(!search.is_initialised());
    }

    #[test]
    fn test_multi_face_reference_uses_first_face() {
        let dir = tempfile::tempdir().unwrap();
        let reference = write_split(dir.path(), "pair.png", RED, BLUE);
        let red = write_solid(dir.path(), "red.png", RED);
        let green = write_solid(dir.path(), "green.png", [0, 200, 0]);
        let (mut search, _) = use_case(vec![LEFT_FACE, RIGHT_FACE]);

        let found = search
            .search_with_template(&reference, &[green, red.clone()])
            .unwrap();
        assert_eq!(found, vec![red]);
    }

    #[test]
    fn test_candidate_with_several_matching_faces_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let reference = write_solid(dir.path(), "reference.png", RED);
        let twins = write_solid(dir.path(), "twins.png", RED);
        let (mut search, _) = use_case(vec![LEFT_FACE, RIGHT_FACE]);

        let found = search
            .search_with_template(&reference, &[twins.clone(), twins.clone()])
            .unwrap();
        assert_eq!(found, vec![twins]);
    }

    #[test]
    fn test_undecodable_candidate_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let (reference, reds, _) = fixture(dir.path());
        let broken = dir.path().join("broken.jpg");
        std::fs::write(&broken, b"not an image").unwrap();
        let (mut search, _) = use_case(vec![CENTRED_FACE]);

        let found = search
            .search_with_template(&reference, &[broken, reds[0].clone()])
            .unwrap();
        assert_eq!(found, vec![reds[0].clone()]);
    }

    #[test]
    fn test_progress_reports_every_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let (reference, reds, blues) = fixture(dir.path());
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = reports.clone();
        let (search, _) = use_case(vec![CENTRED_FACE]);
        let mut search = search.with_progress(Box::new(move |done: usize, total: usize| {
            sink.lock().unwrap().push((done, total));
        }));

        search
            .search_with_template(&reference, &interleaved(&reds, &blues))
            .unwrap();
        let reports = reports.lock().unwrap();
        assert_eq!(reports.len(), 8);
        assert_eq!(reports.last(), Some(&(8, 8)));
    }

    #[test]
    fn test_set_jitter_drops_reference_only_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let (reference, _, _) = fixture(dir.path());
        let (mut search, _) = use_case(vec![CENTRED_FACE]);
        search.init(&reference).unwrap();

        search.set_jitter(false);
        assert!(search.is_initialised());
        search.set_jitter(true);
        assert!(!search.is_initialised());
        assert!(search.recogniser().jitter());
    }

    #[test]
    fn test_reference_embedding_tracks_init() {
        let (mut search, _) = use_case(vec![CENTRED_FACE]);
        assert!(search.reference_embedding().is_none());

        assert!(search.init_from_image(&Image::filled(32, 32, RED)).unwrap());
        let reference = search.reference_embedding().unwrap();
        let expected = mean_colour(&Image::filled(4, 4, RED));
        assert!(reference.distance(&expected) < 0.05);

        search.set_jitter(true);
        assert!(search.reference_embedding().is_none());
    }
}
