mod abort;
mod checkpoint;
mod handoff;
mod timeline;
