//! Flattening of the course tree into a single viewing order, plus
//! predecessor/successor lookup for the lesson currently on screen.

use crate::model::{Course, Lesson, LessonId, ModuleId};

/// Lightweight pointer to a lesson's position in the course tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonRef {
    pub module_id: ModuleId,
    pub lesson_id: LessonId,
}

/// One entry of the flattened sequence: a lesson annotated with its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceEntry {
    module_id: ModuleId,
    lesson: Lesson,
}

impl SequenceEntry {
    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    #[must_use]
    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    #[must_use]
    pub fn lesson_ref(&self) -> LessonRef {
        LessonRef {
            module_id: self.module_id,
            lesson_id: self.lesson.id(),
        }
    }
}

/// Neighbors of the lesson being viewed, resolved against the flattened order.
///
/// `current` is absent when the requested lesson id does not occur anywhere in
/// the course; the neighbors are then absent too. This is the lesson-not-found
/// condition and is not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonNavigation {
    pub current: Option<SequenceEntry>,
    pub previous: Option<LessonRef>,
    pub next: Option<LessonRef>,
}

impl LessonNavigation {
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            current: None,
            previous: None,
            next: None,
        }
    }
}

/// The flattened, globally ordered lesson sequence of one course.
///
/// Derived and ephemeral: rebuild it whenever the course aggregate changes.
/// The input aggregate is trusted to be fully loaded; a partial aggregate
/// silently yields a partial sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonSequence {
    entries: Vec<SequenceEntry>,
}

impl LessonSequence {
    /// Flatten all lessons of the course and sort them by
    /// (module order key, lesson order key) ascending.
    ///
    /// The sort is stable: entries with colliding keys keep the order in
    /// which they appear in the aggregate.
    #[must_use]
    pub fn from_course(course: &Course) -> Self {
        let mut keyed: Vec<(i32, SequenceEntry)> = Vec::with_capacity(course.lesson_count());
        for module in course.modules() {
            for lesson in module.lessons() {
                keyed.push((
                    module.order_index(),
                    SequenceEntry {
                        module_id: module.id(),
                        lesson: lesson.clone(),
                    },
                ));
            }
        }

        keyed.sort_by_key(|(module_order, entry)| (*module_order, entry.lesson.order_index()));

        Self {
            entries: keyed.into_iter().map(|(_, entry)| entry).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[SequenceEntry] {
        &self.entries
    }

    /// Iterate the sequence as (module, lesson) id pairs.
    pub fn refs(&self) -> impl Iterator<Item = LessonRef> + '_ {
        self.entries.iter().map(SequenceEntry::lesson_ref)
    }

    /// Locate a lesson and its immediate neighbors.
    ///
    /// Scans linearly for the first entry whose lesson id matches; duplicate
    /// lesson ids across modules resolve to the earliest position.
    #[must_use]
    pub fn locate(&self, lesson_id: LessonId) -> LessonNavigation {
        let Some(index) = self
            .entries
            .iter()
            .position(|e| e.lesson.id() == lesson_id)
        else {
            return LessonNavigation::not_found();
        };

        let previous = index
            .checked_sub(1)
            .map(|i| self.entries[i].lesson_ref());
        let next = self.entries.get(index + 1).map(SequenceEntry::lesson_ref);

        LessonNavigation {
            current: Some(self.entries[index].clone()),
            previous,
            next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CourseId, Lesson, Module};
    use crate::time::fixed_now;

    fn lesson(id: u128, order_index: i32) -> Lesson {
        Lesson::new(
            LessonId::from_u128(id),
            format!("Aula {id}"),
            None,
            60,
            order_index,
            None,
        )
        .unwrap()
    }

    fn course(modules: Vec<Module>) -> Course {
        Course::new(CourseId::from_u128(1), "Curso", None, fixed_now(), modules).unwrap()
    }

    /// Two modules with order keys [0, 1], two lessons each with keys [0, 1]:
    /// the flattened order must be exactly m0l0, m0l1, m1l0, m1l1.
    #[test]
    fn flattens_in_module_then_lesson_order() {
        let m0 = Module::new(
            ModuleId::from_u128(10),
            "M0",
            0,
            vec![lesson(1, 0), lesson(2, 1)],
        )
        .unwrap();
        let m1 = Module::new(
            ModuleId::from_u128(11),
            "M1",
            1,
            vec![lesson(3, 0), lesson(4, 1)],
        )
        .unwrap();

        let seq = LessonSequence::from_course(&course(vec![m1, m0]));

        let ids: Vec<u128> = seq
            .refs()
            .map(|r| r.lesson_id.value().as_u128())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn length_equals_total_lesson_count() {
        let m0 = Module::new(
            ModuleId::from_u128(10),
            "M0",
            3,
            vec![lesson(1, 7), lesson(2, 2), lesson(3, 9)],
        )
        .unwrap();
        let m1 = Module::new(ModuleId::from_u128(11), "M1", 1, vec![lesson(4, 0)]).unwrap();
        let m2 = Module::new(ModuleId::from_u128(12), "M2", 8, Vec::new()).unwrap();

        let c = course(vec![m0, m1, m2]);
        let seq = LessonSequence::from_course(&c);
        assert_eq!(seq.len(), c.lesson_count());
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn non_contiguous_order_keys_still_sort_ascending() {
        let m0 = Module::new(
            ModuleId::from_u128(10),
            "M0",
            -5,
            vec![lesson(1, 100), lesson(2, -3)],
        )
        .unwrap();
        let m1 = Module::new(ModuleId::from_u128(11), "M1", 40, vec![lesson(3, 0)]).unwrap();

        let seq = LessonSequence::from_course(&course(vec![m1, m0]));
        let ids: Vec<u128> = seq
            .refs()
            .map(|r| r.lesson_id.value().as_u128())
            .collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn colliding_order_keys_keep_aggregate_order() {
        // Same (module, lesson) keys everywhere: stable sort preserves the
        // order lessons appear in the aggregate.
        let m0 = Module::new(
            ModuleId::from_u128(10),
            "M0",
            0,
            vec![lesson(1, 0), lesson(2, 0)],
        )
        .unwrap();
        let m1 = Module::new(ModuleId::from_u128(11), "M1", 0, vec![lesson(3, 0)]).unwrap();

        let seq = LessonSequence::from_course(&course(vec![m0, m1]));
        let ids: Vec<u128> = seq
            .refs()
            .map(|r| r.lesson_id.value().as_u128())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn locate_resolves_neighbors() {
        let m0 = Module::new(
            ModuleId::from_u128(10),
            "M0",
            0,
            vec![lesson(1, 0), lesson(2, 1)],
        )
        .unwrap();
        let m1 = Module::new(
            ModuleId::from_u128(11),
            "M1",
            1,
            vec![lesson(3, 0), lesson(4, 1)],
        )
        .unwrap();
        let seq = LessonSequence::from_course(&course(vec![m0, m1]));

        // Interior lesson: both neighbors present, next crosses the module
        // boundary.
        let nav = seq.locate(LessonId::from_u128(2));
        let current = nav.current.unwrap();
        assert_eq!(current.lesson().id(), LessonId::from_u128(2));
        assert_eq!(current.module_id(), ModuleId::from_u128(10));
        assert_eq!(
            nav.previous,
            Some(LessonRef {
                module_id: ModuleId::from_u128(10),
                lesson_id: LessonId::from_u128(1),
            })
        );
        assert_eq!(
            nav.next,
            Some(LessonRef {
                module_id: ModuleId::from_u128(11),
                lesson_id: LessonId::from_u128(3),
            })
        );
    }

    #[test]
    fn locate_first_lesson_has_no_previous() {
        let m0 = Module::new(
            ModuleId::from_u128(10),
            "M0",
            0,
            vec![lesson(1, 0), lesson(2, 1)],
        )
        .unwrap();
        let seq = LessonSequence::from_course(&course(vec![m0]));

        let nav = seq.locate(LessonId::from_u128(1));
        assert!(nav.current.is_some());
        assert!(nav.previous.is_none());
        assert_eq!(
            nav.next.map(|r| r.lesson_id),
            Some(LessonId::from_u128(2))
        );
    }

    #[test]
    fn locate_last_lesson_has_no_next() {
        let m0 = Module::new(
            ModuleId::from_u128(10),
            "M0",
            0,
            vec![lesson(1, 0), lesson(2, 1)],
        )
        .unwrap();
        let seq = LessonSequence::from_course(&course(vec![m0]));

        let nav = seq.locate(LessonId::from_u128(2));
        assert!(nav.current.is_some());
        assert_eq!(
            nav.previous.map(|r| r.lesson_id),
            Some(LessonId::from_u128(1))
        );
        assert!(nav.next.is_none());
    }

    #[test]
    fn locate_unknown_lesson_reports_not_found() {
        let m0 = Module::new(ModuleId::from_u128(10), "M0", 0, vec![lesson(1, 0)]).unwrap();
        let seq = LessonSequence::from_course(&course(vec![m0]));

        let nav = seq.locate(LessonId::from_u128(99));
        assert_eq!(nav, LessonNavigation::not_found());
    }

    #[test]
    fn locate_duplicate_lesson_id_picks_first_position() {
        let m0 = Module::new(ModuleId::from_u128(10), "M0", 0, vec![lesson(7, 0)]).unwrap();
        let m1 = Module::new(ModuleId::from_u128(11), "M1", 1, vec![lesson(7, 0)]).unwrap();
        let seq = LessonSequence::from_course(&course(vec![m0, m1]));

        let nav = seq.locate(LessonId::from_u128(7));
        assert_eq!(
            nav.current.unwrap().module_id(),
            ModuleId::from_u128(10)
        );
        assert!(nav.previous.is_none());
    }

    #[test]
    fn empty_course_yields_empty_sequence() {
        let seq = LessonSequence::from_course(&course(Vec::new()));
        assert!(seq.is_empty());
        assert_eq!(
            seq.locate(LessonId::from_u128(1)),
            LessonNavigation::not_found()
        );
    }
}
