use std::thread;
use std::sync::mpsc;
use std::sync::{ Arc, Mutex };
use std::time::Instant;

use log::{ debug, info, warn };

use crate::color::Color;
use crate::world::World;
use crate::camera::Camera;
use crate::canvas::Canvas;

/// A job for the worker threads.
pub enum Message {
    /// Render one row of the image.
    Row(usize),
    Terminate,
}

/// A finished row, tagged with its index.
type RenderedRow = (usize, Vec<Color>);

struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(id: usize, world: Arc<World>, camera: Arc<Camera>,
        receiver: Arc<Mutex<mpsc::Receiver<Message>>>,
        results: mpsc::Sender<RenderedRow>) -> Worker {

        let thread = thread::spawn(move || loop {
            // Obtain the message being executed. A poisoned lock or a closed
            // channel both mean the pool is gone.
            let message = match receiver.lock() {
                Ok(rx) => rx.recv(),
                Err(_) => break,
            };

            match message {
                Ok(Message::Row(y)) => {
                    let row = camera.render_row(&world, y);
                    debug!("Worker {} finished row {}", id, y);

                    if results.send((y, row)).is_err() {
                        break;
                    }
                },

                Ok(Message::Terminate) | Err(_) => break,
            }
        });

        Worker { id, thread: Some(thread) }
    }
}

/// A fixed-size pool of render threads sharing one scene.
pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: mpsc::Sender<Message>,
}

impl ThreadPool {
    /// Spawns `size` workers. Finished rows are sent back through `results`.
    ///
    /// At least one worker is always spawned.
    pub fn new(size: usize, world: Arc<World>, camera: Arc<Camera>,
        results: mpsc::Sender<RenderedRow>) -> ThreadPool {
        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size.max(1))
            .map(|id| Worker::new(
                id,
                Arc::clone(&world),
                Arc::clone(&camera),
                Arc::clone(&receiver),
                results.clone(),
            ))
            .collect();

        ThreadPool { workers, sender }
    }

    pub fn execute(&self, message: Message) {
        if self.sender.send(message).is_err() {
            warn!("All render workers have exited; dropping job");
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        for _ in &self.workers {
            // Workers that already exited no longer listen
            let _ = self.sender.send(Message::Terminate);
        }

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    warn!("Render worker {} panicked", worker.id);
                }
            }
        }
    }
}

/// Renders the scene with a pool of `threads` workers, one row per job.
///
/// The result is identical to `Camera::render`.
pub fn parallel_render(world: Arc<World>, camera: Arc<Camera>, threads: usize)
    -> Canvas {
    let (vsize, hsize) = (camera.vsize, camera.hsize);
    let mut canvas = Canvas::new(hsize, vsize);
    let start = Instant::now();

    info!("Rendering {}x{} image using {} threads...",
        hsize, vsize, threads.max(1));
    {
        let (results, finished) = mpsc::channel();
        let thread_pool = ThreadPool::new(
            threads, world, Arc::clone(&camera), results
        );

        for y in 0..vsize {
            thread_pool.execute(Message::Row(y));
        }

        // Ends early only if every worker died
        for (y, row) in finished.iter().take(vsize) {
            canvas.write_row(y, &row);
        }
    }
    info!("...done in {:.2?}.", start.elapsed());

    canvas
}

#[cfg(test)]
fn default_camera(hsize: usize, vsize: usize) -> Camera {
    use crate::matrix::Matrix4D;
    use crate::tuple::Tuple4D;

    Camera::new(hsize, vsize, std::f64::consts::PI / 2.0,
        Matrix4D::view_transform(
            Tuple4D::point(0.0, 0.0, -5.0),
            Tuple4D::point(0.0, 0.0, 0.0),
            Tuple4D::vector(0.0, 1.0, 0.0),
        )).unwrap()
}

#[test]
fn parallel_render_matches_sequential_render() {
    let world = Arc::new(World::default());
    let camera = Arc::new(default_camera(11, 7));

    let sequential = camera.render(&world);
    let parallel = parallel_render(Arc::clone(&world), Arc::clone(&camera), 3);

    assert_eq!(parallel, sequential);
}

#[test]
fn parallel_render_with_zero_threads_still_renders() {
    let world = Arc::new(World::default());
    let camera = Arc::new(default_camera(11, 11));

    let image = parallel_render(world, camera, 0);

    assert!(image.read_pixel(5, 5).unwrap()
        .approx_eq(&Color::rgb(0.38066, 0.47583, 0.2855), 1e-4));
}
