//! Built-in example datasets written to an empty medium on first load.

use crate::model::{Application, ApplicationStatus, Document, Program, University};

const ENGLISH: &str = "English";
const FOUR_YEARS: &str = "4 years";
const THREE_AND_HALF_YEARS: &str = "3.5 years";
const SEPTEMBER: &str = "September";
const SEPTEMBER_FEBRUARY: &str = "September, February";

fn program(title: &str, duration: &str, tuition: &str, intake: &str) -> Program {
    Program::new(title, duration, ENGLISH, tuition, intake)
}

fn features(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Default university catalog.
#[must_use]
pub fn universities() -> Vec<University> {
    vec![
        University {
            id: "uni-eka".to_string(),
            name: "EKA University of Applied Sciences".to_string(),
            logo: "https://cms.studyinlatvia.lv/storage/app/uploads/public/64a/dd1/b0d/64add1b0dca6a751914494.jpg".to_string(),
            description: "EKA University of Applied Sciences is a modern, dynamically developing higher education institution that provides high-quality education and prepares competitive specialists for Latvia and the international market.".to_string(),
            location: "Riga, Latvia".to_string(),
            country: "Latvia".to_string(),
            programs: vec![
                program("Business Administration and Digital Innovation", FOUR_YEARS, "€3,500/year", SEPTEMBER),
                program("International Marketing and Advertising", FOUR_YEARS, "€3,800/year", SEPTEMBER),
                program("Digital Marketing and Social Media", THREE_AND_HALF_YEARS, "€3,600/year", SEPTEMBER_FEBRUARY),
                program("Finance and Investment Management", FOUR_YEARS, "€3,700/year", SEPTEMBER),
            ],
            features: features(&[
                "Modern study environment",
                "International faculty",
                "EU recognized diploma",
                "Career development support",
            ]),
        },
        University {
            id: "uni-tti".to_string(),
            name: "Transport and Telecommunication Institute".to_string(),
            logo: "https://www.tsi.lv/sites/default/files/editor/About/Facts/tsi_logo_eng.jpg".to_string(),
            description: "TTI is a modern university offering high-quality education in transport, logistics, IT and aviation, combining academic knowledge with practical skills.".to_string(),
            location: "Riga, Latvia".to_string(),
            country: "Latvia".to_string(),
            programs: vec![
                program("Computer Science and Software Engineering", FOUR_YEARS, "€4,000/year", SEPTEMBER_FEBRUARY),
                program("Aviation Management", THREE_AND_HALF_YEARS, "€4,200/year", SEPTEMBER),
                program("Robotics and Intelligent Systems", FOUR_YEARS, "€4,100/year", SEPTEMBER),
                program("Data Science and Business Analytics", THREE_AND_HALF_YEARS, "€4,000/year", SEPTEMBER_FEBRUARY),
                program("Logistics and Supply Chain Management", FOUR_YEARS, "€3,900/year", SEPTEMBER),
            ],
            features: features(&[
                "State-of-the-art laboratories",
                "Industry partnerships",
                "International environment",
                "Research opportunities",
            ]),
        },
        University {
            id: "uni-vilniustech".to_string(),
            name: "Vilnius Tech University".to_string(),
            logo: "https://vilniustech.lt/files/4181/209/10/12_0/VILNIUS%20TECH%20logotipas.png".to_string(),
            description: "VILNIUS TECH is one of the largest research universities in Lithuania, focusing on technology, engineering, and innovation.".to_string(),
            location: "Vilnius, Lithuania".to_string(),
            country: "Lithuania".to_string(),
            programs: vec![
                program("Mechanical Engineering and Robotics", FOUR_YEARS, "€3,800/year", SEPTEMBER),
                program("Sustainable Architecture", FOUR_YEARS, "€4,500/year", SEPTEMBER),
                program("Digital Media Engineering", THREE_AND_HALF_YEARS, "€3,900/year", SEPTEMBER_FEBRUARY),
                program("Civil Engineering", FOUR_YEARS, "€3,800/year", SEPTEMBER),
                program("Environmental Engineering", FOUR_YEARS, "€3,700/year", SEPTEMBER),
                program("Information Systems Engineering", THREE_AND_HALF_YEARS, "€4,000/year", SEPTEMBER_FEBRUARY),
            ],
            features: features(&[
                "Top-ranked technical university",
                "Strong industry connections",
                "Modern campus facilities",
                "International research projects",
            ]),
        },
        University {
            id: "uni-ktu".to_string(),
            name: "Kaunas University of Technology".to_string(),
            logo: "https://en.ktu.edu/wp-content/uploads/sites/5/2016/04/KTU_logo_PNG.png".to_string(),
            description: "KTU is Lithuania's largest technical university, known for its strong focus on innovation, research, and industry collaboration.".to_string(),
            location: "Kaunas, Lithuania".to_string(),
            country: "Lithuania".to_string(),
            programs: vec![
                program("Artificial Intelligence and Data Science", FOUR_YEARS, "€4,200/year", SEPTEMBER),
                program("Industrial Engineering and Management", FOUR_YEARS, "€3,600/year", SEPTEMBER),
                program("Software Systems Engineering", FOUR_YEARS, "€4,000/year", SEPTEMBER_FEBRUARY),
                program("Mechatronics Engineering", FOUR_YEARS, "€3,800/year", SEPTEMBER),
                program("Sustainable Energy Engineering", FOUR_YEARS, "€3,900/year", SEPTEMBER),
            ],
            features: features(&[
                "Leading research facilities",
                "Startup ecosystem",
                "Global partnerships",
                "Career mentoring program",
            ]),
        },
    ]
}

fn document(kind: &str, name: &str) -> Document {
    Document {
        kind: kind.to_string(),
        name: name.to_string(),
        url: Document::PLACEHOLDER_URL.to_string(),
    }
}

/// Default applications shown in a fresh admin console.
#[must_use]
pub fn applications() -> Vec<Application> {
    vec![
        Application {
            id: "1".to_string(),
            student_name: "John Smith".to_string(),
            email: "john.smith@example.com".to_string(),
            phone: "+371 20123456".to_string(),
            program: "Business Administration and Digital Innovation".to_string(),
            university: "EKA University of Applied Sciences".to_string(),
            status: ApplicationStatus::Reviewing,
            submitted_at: "2024-03-15T10:30:00Z".to_string(),
            documents: vec![
                document("passport", "passport.pdf"),
                document("transcript", "academic_transcript.pdf"),
            ],
            notes: "Candidate has strong academic background".to_string(),
        },
        Application {
            id: "2".to_string(),
            student_name: "Maria Garcia".to_string(),
            email: "maria.garcia@example.com".to_string(),
            phone: "+371 20789012".to_string(),
            program: "Computer Science and Software Engineering".to_string(),
            university: "Transport and Telecommunication Institute".to_string(),
            status: ApplicationStatus::Pending,
            submitted_at: "2024-03-14T15:45:00Z".to_string(),
            documents: vec![
                document("passport", "passport.pdf"),
                document("transcript", "transcript.pdf"),
            ],
            notes: String::new(),
        },
    ]
}
